use std::sync::LazyLock;

pub struct PackConfig {
    bind_addr: String,
    jpeg_quality: u8,
    max_dimension: u32,
    archive_name: String,
}

impl PackConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("IMGPACK_BIND", "0.0.0.0:8080"),
            jpeg_quality: env_or("IMGPACK_QUALITY", "95").parse().unwrap_or(95),
            max_dimension: env_or("IMGPACK_MAX_DIMENSION", "2048")
                .parse()
                .unwrap_or(2048),
            archive_name: env_or("IMGPACK_ARCHIVE_NAME", "images.zip"),
        }
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    pub fn archive_name(&self) -> &str {
        &self.archive_name
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn config() -> &'static PackConfig {
    static CONFIG: LazyLock<PackConfig> = LazyLock::new(PackConfig::from_env);
    &CONFIG
}

pub struct Env {
    pub ip: String,
    pub port: u16,
    pub frontend_url: String,
    pub upload_route: String,
    pub storage_route: String,
    pub upload_max_file_size: Option<String>,
    pub upload_max_part_size: Option<String>,
    pub upload_allowed_extensions: Option<String>,
    pub upload_storage_path: Option<String>,
    pub upload_base_url: Option<String>,
    pub upload_enable_timestamp: bool,
    pub upload_create_date_dir: bool,
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag(name: &str) -> bool {
    optional(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl Env {
    fn new() -> Self {
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let upload_route = std::env::var("UPLOAD_ROUTE").unwrap_or_else(|_| "/upload".to_string());
        let storage_route =
            std::env::var("STORAGE_ROUTE").unwrap_or_else(|_| "/storage".to_string());

        Env {
            ip,
            port,
            frontend_url,
            upload_route,
            storage_route,
            upload_max_file_size: optional("UPLOAD_MAX_FILE_SIZE"),
            upload_max_part_size: optional("UPLOAD_MAX_PART_SIZE"),
            upload_allowed_extensions: optional("UPLOAD_ALLOWED_EXTENSIONS"),
            upload_storage_path: optional("UPLOAD_STORAGE_PATH"),
            upload_base_url: optional("UPLOAD_BASE_URL"),
            upload_enable_timestamp: flag("UPLOAD_ENABLE_TIMESTAMP"),
            upload_create_date_dir: flag("UPLOAD_CREATE_DATE_DIR"),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

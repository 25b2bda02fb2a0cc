pub mod server {
    pub const NAME: &str = "finsage";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PROTOCOL_VERSION: &str = "2025-06-18";
}

pub mod upstream {
    pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
    pub const API_KEY_ENV: &str = "FINNHUB_API_KEY";
    pub const BASE_URL_ENV: &str = "FINNHUB_BASE_URL";
    pub const TOKEN_PARAM: &str = "token";
    pub const USER_AGENT: &str = concat!("finsage/", env!("CARGO_PKG_VERSION"));
}

pub mod limits {
    pub const DEFAULT_BULK_CONCURRENCY: usize = 8;
    pub const DEFAULT_BULK_MAX_SYMBOLS: usize = 50;
    pub const LOG_BODY_PREVIEW_BYTES: usize = 256;
    pub const SUGGESTION_LIMIT: usize = 5;
}

pub mod news {
    pub const CATEGORIES: &[&str] = &["general", "forex", "crypto", "merger"];
    pub const DEFAULT_CATEGORY: &str = "general";
}

pub mod ui {
    pub const CHART_VIEW_URI: &str = "ui://finsage/chart-view.html";
    pub const CHART_VIEW_NAME: &str = "FinSage Chart";
    pub const CHART_VIEW_MIME: &str = "text/html;profile=mcp-app";
    pub const RESOURCE_DOMAINS: &[&str] = &["https://cdn.jsdelivr.net", "https://unpkg.com"];
    pub const TEMPLATE_ENV: &str = "FINSAGE_CHART_TEMPLATE";

    pub const PALETTE: &[&str] = &[
        "rgba(59, 130, 246, 0.8)",
        "rgba(16, 185, 129, 0.8)",
        "rgba(245, 158, 11, 0.8)",
        "rgba(239, 68, 68, 0.8)",
        "rgba(139, 92, 246, 0.8)",
        "rgba(236, 72, 153, 0.8)",
        "rgba(20, 184, 166, 0.8)",
        "rgba(249, 115, 22, 0.8)",
    ];
}

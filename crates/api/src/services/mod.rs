//! Rendering and external storage integrations.

pub mod cookies;
pub mod media_storage;
pub mod site_page;

pub use cookies::CookieHelper;
pub use media_storage::{build_object_storage, detect_image, HttpObjectStorage, LocalObjectStorage};
pub use site_page::{escape_html, render_error, render_not_found, Notice, SitePage};

mod health;
mod redirect;
mod url;

pub use health::health_handler;
pub use redirect::{redirect_handler, resolve_handler};
pub use url::{create_url_handler, get_url_handler, list_owner_urls_handler};

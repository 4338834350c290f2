//! twig
//!
//! A small UI framework: state lives in a [`Store`], a pure view function
//! turns it into virtual nodes, and the render driver reconciles them into
//! a live [`dom::Document`].
//!
//! # Example
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use twig_app::dom::Document;
//! use twig_app::vdom::{Attrs, h};
//! use twig_app::{AppConfig, create_app};
//!
//! let document = Rc::new(RefCell::new(Document::default()));
//! let config = AppConfig::new(|state| {
//!     let count = state.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
//!     h("p", Attrs::new(), format!("clicked {count} times"))
//! })
//! .initial_state(json!({ "count": 0 }));
//!
//! let app = create_app(document, config)?;
//! app.set_state(json!({ "count": 1 }));
//! assert_eq!(app.render_count(), 2);
//! # Ok::<(), twig_app::AppError>(())
//! ```

mod app;
mod binding;
mod error;
mod frame;
mod render;
mod router;
mod storage;
mod store;

pub use app::{App, AppConfig, SharedDocument, View, create_app};
pub use binding::{bind_input, get_path, set_path};
pub use error::AppError;
pub use frame::FrameQueue;
pub use render::{Mount, RenderOptions};
pub use router::{DEFAULT_ROUTE, HashRouter};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, load_records, save_records};
pub use store::{State, Store};

// Re-export sub-crates for advanced usage
pub use twig_dom as dom;
pub use twig_vdom as vdom;

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ai;
pub mod cards;
pub mod config;
pub mod nav;
pub mod script;
pub mod session;
pub mod state;
pub mod widget;

// Re-export main types for convenience
pub use ai::{GeminiClient, FALLBACK_MESSAGE};
pub use config::Config;
pub use nav::NavContext;
pub use script::{Effect, Timeline};
pub use session::{PendingTurn, Session};
pub use state::{HistoryEntry, Message, Role, Transcript};
pub use widget::{Action, Control, ControlKind, FormField, Payload, Widget, WidgetAction};

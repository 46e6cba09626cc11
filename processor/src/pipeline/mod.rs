pub mod layout;
pub mod session;

pub use layout::{EffectKind, EffectSpec, Layout, LayoutError, Stage};
pub use session::{DetectionTicket, EffectSettings, Session};

pub mod collection;
pub mod language;
pub mod open;
pub mod reset;
pub mod settings;
pub mod setup;
pub mod template;
pub mod transfer;

pub use collection::*;
pub use language::*;
pub use open::*;
pub use reset::*;
pub use settings::*;
pub use setup::*;
pub use template::*;
pub use transfer::*;

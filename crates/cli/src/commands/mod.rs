pub mod chat;
pub mod parts;
pub mod recognize;
pub mod storage;
pub mod voice;

pub use chat::ChatCommand;
pub use parts::{AddCommand, AddPhotoCommand, DeleteCommand, EditCommand, ImportCommand, ListCommand};
pub use recognize::RecognizeCommand;
pub use storage::InitStorageCommand;
pub use voice::VoiceCommand;

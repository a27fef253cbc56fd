//! Key acquisition: input devices, the key stream and keyboard macros.

mod device;
mod key_stream;
mod macros;
mod scan;

pub use device::{ChannelDevice, InputDevice, MemoryDevice};
pub use key_stream::KeyStream;
pub use macros::{MACRO_RECURSION_LIMIT, MacroEngine, MacroError, inputrc_notation};
pub use scan::{CursorPos, CursorScan, Utf8Decoder};

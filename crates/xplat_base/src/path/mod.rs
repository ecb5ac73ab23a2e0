/* 📖 # How is the path engine layered?

`file_path` holds the data model (volume, rootedness, segments) and rendering.
`parser` turns strings into that model for one platform, `algebra` implements
clean/join/rel and friends on parsed values, and `processor` wraps all three
behind string-in, string-out operations.
*/

mod algebra;
mod file_path;
mod parser;
mod processor;

pub use file_path::{
    BACKWARD_SLASH, COLON, CURRENT_DIRECTORY, Comparison, FORWARD_SLASH, FilePath,
    PARENT_DIRECTORY, SEMICOLON, Volume,
};
pub use parser::Parser;
pub use processor::Processor;

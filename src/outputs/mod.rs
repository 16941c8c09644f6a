//! Durable artifacts of a run, besides the rendered files themselves.
//!
//! # Submodules
//!
//! - [`archive`]: the link archive written before conversion starts, and
//!   reading of user-supplied link files
//! - [`error_log`]: the append-only `errors.log`
//!
//! # Output Structure
//!
//! ```text
//! out/
//! └── dnainfo/
//!     └── doe/
//!         ├── jane-doe.txt                         # link archive
//!         ├── errors.log                           # url + first diagnostic line per failure
//!         └── new-york-20171101-some-story.pdf     # one per converted link
//! ```

pub mod archive;
pub mod error_log;

//! Snapshot codec for condition reference repositories.
//!
//! Encodes an ordered collection of `{key, name, address}` records
//! into one of three self-contained textual formats and decodes each
//! of them back losslessly:
//!
//! - self-describing fixed-width text (direct-offset record access),
//! - delimiter-separated text,
//! - XML (`collection` document with `<ref/>` elements).
//!
//! ```no_run
//! use condrepo::{load, save, Entry};
//!
//! let data = vec![Entry::new(0x2A, "temperature", "/calib/temp")];
//! save("conditions.txt", &data)?;
//! let restored = load("conditions.txt")?;
//! assert_eq!(restored, data);
//! # Ok::<(), condrepo::RepoError>(())
//! ```

/// Format dispatch, text/XML codecs, file save/load boundary.
pub mod codec;
/// Common error type and result alias.
pub mod error;
/// Record model: Entry, Data collection, caller-side aggregation.
pub mod repo;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Codec entry points and configuration.
pub use codec::{
    decode_records, encode_records, load, load_as, save, save_as, CodecConfig, Format,
};
/// Operation errors and result type.
pub use error::{RepoError, RepoResult};
/// Record model and aggregation helper.
pub use repo::{aggregate, Data, Entry};

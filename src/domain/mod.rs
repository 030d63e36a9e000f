//! Domain layer: request, engine response and revocation types.
//! Pure data and rules; no I/O happens here.

pub mod presign;
pub mod request;
pub mod response;
pub mod revocation;

pub use presign::{PreSignData, PreSignPackage};
pub use request::{
    FieldFormat, Rect, ResolvedSignOptions, SignRequest, SignatureKind, Visibility,
};
pub use response::{ResponseCode, SignResult};
pub use revocation::{
    normalize_crl, parse_descriptors, FetchOutcome, RevocationBundle, RevocationDescriptor,
    RevocationKind,
};

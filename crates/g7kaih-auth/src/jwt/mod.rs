//! JWT token encoding, decoding, and refresh rotation.

pub mod claims;
pub mod clock;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod service;

pub use claims::{Claims, TokenType};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decoder::JwtDecoder;
pub use encoder::{JwtEncoder, TokenPair};
pub use error::TokenError;
pub use service::TokenService;

//! Matrix facades
//!
//! [`Matrix`] is generic over a [`Field`](crate::field::Field) and any storage
//! layout. [`RealMatrix`] is the primitive-double specialization over
//! [`DoubleStorage`](crate::storage::DoubleStorage). Both are immutable under
//! algebra and delegate the numeric work to the provider bound at
//! construction.

mod core;
mod operand;
mod real;
mod vector;

pub use self::core::Matrix;
pub use operand::Operand;
pub use real::RealMatrix;
pub use vector::Vector;

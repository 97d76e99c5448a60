//! Small building blocks shared by the area system.

mod bits;
mod id_allocator;

pub use bits::SetBits;
pub use id_allocator::IdAllocator;

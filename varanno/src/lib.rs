#[cfg(feature = "core")]
#[doc(inline)]
pub use varanno_core as core;

#[cfg(feature = "annotate")]
#[doc(inline)]
pub use varanno_annotate as annotate;

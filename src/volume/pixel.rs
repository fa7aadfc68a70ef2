//! Native pixel types the stabilizer can round-trip.

/// A numeric sample type that can be moved into the f32 processing domain
/// and back.
///
/// `from_f32` rounds integer types to the nearest value and uses the native
/// `as` cast, so out-of-range values saturate for integer types and pass
/// through for float types; no extra clamping is applied on top of that.
pub trait Pixel: Copy + PartialOrd + Send + Sync + 'static {
    fn to_f32(self) -> f32;
    fn from_f32(v: f32) -> Self;
}

macro_rules! impl_pixel_int {
    ($($t:ty),*) => {
        $(impl Pixel for $t {
            #[inline]
            fn to_f32(self) -> f32 {
                self as f32
            }

            #[inline]
            fn from_f32(v: f32) -> Self {
                v.round() as $t
            }
        })*
    };
}

macro_rules! impl_pixel_float {
    ($($t:ty),*) => {
        $(impl Pixel for $t {
            #[inline]
            fn to_f32(self) -> f32 {
                self as f32
            }

            #[inline]
            fn from_f32(v: f32) -> Self {
                v as $t
            }
        })*
    };
}

impl_pixel_int!(u8, u16, u32, i8, i16, i32);
impl_pixel_float!(f32, f64);

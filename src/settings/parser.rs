use alloc::{
    string::{String, ToString as _},
    vec::Vec,
};

/// Type a setting's raw string can be parsed into
pub trait FromSetting: Sized {
    /// # Errors
    /// Returns the reason the value is invalid
    fn from_setting(raw: &str) -> Result<Self, String>;
}

impl FromSetting for String {
    #[inline]
    fn from_setting(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

/// `1`, `true`, `yes` and `on` in any case are `true`, anything else is `false`
impl FromSetting for bool {
    #[inline]
    fn from_setting(raw: &str) -> Result<Self, String> {
        Ok(["1", "true", "yes", "on"]
            .iter()
            .any(|truthy| raw.trim().eq_ignore_ascii_case(truthy)))
    }
}

macro_rules! impl_from_setting {
    ($($ty:ty),*) => {
        $(
            impl FromSetting for $ty {
                #[inline]
                fn from_setting(raw: &str) -> Result<Self, String> {
                    raw.trim().parse().map_err(|err| ::alloc::format!("{err}"))
                }
            }
        )*
    };
}

impl_from_setting!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Comma-separated values. Parts are trimmed, empty ones are skipped.
impl<T: FromSetting> FromSetting for Vec<T> {
    fn from_setting(raw: &str) -> Result<Self, String> {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(T::from_setting)
            .collect()
    }
}

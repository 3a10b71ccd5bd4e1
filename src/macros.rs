/// Builds [`crate::Arguments`]: positional values, then `name = value` pairs after a `;`.
///
/// # Examples
/// ```rust
/// use skuf::args;
///
/// let args = args![1u32, "admin"; verbose = true];
///
/// assert_eq!(args.positional_len(), 2);
/// assert_eq!(args.get::<bool>("verbose"), Some(&true));
/// ```
#[macro_export]
macro_rules! args {
    ($($positional:expr),* $(; $($name:ident = $value:expr),*)?) => {{
        #[allow(unused_mut)]
        let mut args = $crate::Arguments::new();
        $( args.push($positional); )*
        $($( args.insert(::core::stringify!($name), $value); )*)?
        args
    }};
}

/// Builds a [`crate::Signature`]: positional parameters, then named-only ones after a `;`.
/// `=> key` marks a parameter as a dependency.
///
/// # Examples
/// ```rust
/// use skuf::{signature, Key, ParamKind};
///
/// struct Database;
///
/// let signature = signature![user_id, db => Key::of::<Database>(); verbose];
///
/// assert_eq!(signature.position("db"), Some(1));
/// assert_eq!(signature.get("verbose").unwrap().kind(), ParamKind::Named);
/// assert_eq!(signature.markers().count(), 1);
/// ```
#[macro_export]
macro_rules! signature {
    ($($pos:ident $(=> $pos_key:expr)?),* $(; $($named:ident $(=> $named_key:expr)?),*)?) => {{
        let signature = $crate::Signature::new();
        $(
            let signature = signature.param($crate::Param::positional(::core::stringify!($pos)) $(.inject($pos_key))?);
        )*
        $($(
            let signature = signature.param($crate::Param::named(::core::stringify!($named)) $(.inject($named_key))?);
        )*)?
        signature
    }};
}

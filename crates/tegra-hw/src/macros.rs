/// Declares a `#[repr(u32)]` register enum together with a `from_raw` decoder.
///
/// Guest registers carry raw `u32` values; values outside the declared set decode to `None`.
macro_rules! register_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        #[allow(non_camel_case_types)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            pub fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $(v if v == $value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn raw(self) -> u32 {
                self as u32
            }
        }
    };
}

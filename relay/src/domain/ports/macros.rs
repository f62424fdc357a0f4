//! `define_port_error!`: error enums for driven ports.
//!
//! Every adapter failure the relay cares about is a category plus a free-form
//! detail, so each generated variant carries a single `message` field. The
//! macro adds a snake_case constructor per variant and a shared
//! [`message`](#method.message) accessor.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $prefix:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[error("{prefix}: {message}", prefix = $prefix)]
                $variant {
                    /// Detail reported by the adapter.
                    message: String,
                },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build `", stringify!($name), "::", stringify!($variant), "`.")]
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }
                }
            )+

            /// Adapter detail, without the category prefix.
            pub fn message(&self) -> &str {
                match self {
                    $(Self::$variant { message } => message.as_str(),)+
                }
            }
        }
    };
}

pub(crate) use define_port_error;

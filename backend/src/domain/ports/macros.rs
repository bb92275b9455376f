//! `define_port_error!`: error enums for driven ports.
//!
//! Two shapes are accepted. A plain enum lists every variant with its
//! message. A repository enum is written `pub enum Name for "label"` and
//! always starts with `Connection { message }` and `Query { message }`, whose
//! messages are prefixed with the label; any further variants follow.
//!
//! Every variant also gets a snake_case constructor. Field parameters take
//! `impl Into<T>`, so `UserPersistenceError::duplicate("email")` works.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident for $label:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            /// The database could not be reached or no pooled connection was
            /// available.
            #[error("{port} connection failed: {message}", port = $label)]
            Connection { message: String },
            /// A statement failed while executing.
            #[error("{port} query failed: {message}", port = $label)]
            Query { message: String },
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            define_port_error!(@ctor Connection { message: String });
            define_port_error!(@ctor Query { message: String });
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum PantryRepositoryError for "pantry repository" {
            Spoiled { ingredient: String, days: u32 } => "{ingredient} spoiled {days} days ago",
        }
    }

    define_port_error! {
        pub enum OvenError {
            TooHot { celsius: u32 } => "oven at {celsius}C",
            Off => "oven is off",
        }
    }

    #[test]
    fn repository_errors_get_labelled_connection_and_query_variants() {
        assert_eq!(
            PantryRepositoryError::connection("refused").to_string(),
            "pantry repository connection failed: refused"
        );
        assert_eq!(
            PantryRepositoryError::query("syntax error").to_string(),
            "pantry repository query failed: syntax error"
        );
    }

    #[test]
    fn extra_variants_keep_their_field_types() {
        let err = PantryRepositoryError::spoiled("milk", 3_u32);
        assert_eq!(
            err,
            PantryRepositoryError::Spoiled {
                ingredient: "milk".to_owned(),
                days: 3
            }
        );
        assert_eq!(err.to_string(), "milk spoiled 3 days ago");
    }

    #[test]
    fn plain_enums_cover_unit_variants() {
        assert_eq!(OvenError::too_hot(250_u32).to_string(), "oven at 250C");
        assert_eq!(OvenError::off(), OvenError::Off);
    }
}

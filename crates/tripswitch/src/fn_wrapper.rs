// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

/// Defines a named, cloneable wrapper around a boxed callback.
///
/// The wrapper stores the callback behind an `Arc`, so clones are cheap and
/// the wrapper is `Send + Sync` whenever the callback is.
macro_rules! define_fn_wrapper {
    ($(#[$attr:meta])* $name:ident(Fn($($param_name:ident: $param_ty:ty),*))) => {
        $(#[$attr])*
        pub(crate) struct $name(
            std::sync::Arc<dyn Fn($($param_ty),*) + Send + Sync + 'static>,
        );

        impl $name {
            pub(crate) fn new<F>(callback: F) -> Self
            where
                F: Fn($($param_ty),*) + Send + Sync + 'static,
            {
                Self(std::sync::Arc::new(callback))
            }

            pub(crate) fn call(&self, $($param_name: $param_ty),*) {
                (self.0)($($param_name),*);
            }
        }

        impl Clone for $name {
            fn clone(&self) -> Self {
                Self(std::sync::Arc::clone(&self.0))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(concat!(stringify!($name), "(..)"))
            }
        }
    };
}

pub(crate) use define_fn_wrapper;

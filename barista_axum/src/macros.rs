//! Extractors asserting that a request is authorized for a permission

/// Constructs an extractor that authorizes a request for a single permission.
///
/// For a more concise way to construct several guards, see
/// [`permission_guards!`][crate::permission_guards!].
///
/// ```
/// use barista_axum::permission_guard;
///
/// permission_guard!(PostDrinks; "post:drinks");
/// ```
///
/// Use `*` to admit any caller with a valid token:
///
/// ```
/// use barista_axum::permission_guard;
///
/// permission_guard!(pub AnyCaller; *);
/// ```
///
/// The extractor obtains the [`Gate`][barista_auth::Gate] from the router
/// state, so the state must implement `FromRef` for it. The guard holds the
/// verified claims:
///
/// ```no_run
/// use axum::{routing::delete, Router};
/// use barista_auth::Gate;
/// use barista_axum::permission_guard;
///
/// permission_guard!(DeleteDrinks; "delete:drinks");
///
/// async fn delete_drink(DeleteDrinks(claims): DeleteDrinks) -> String {
///     format!("deleted by {:?}", claims.subject())
/// }
///
/// fn router(gate: Gate) -> Router {
///     Router::new()
///         .route("/drinks/:id", delete(delete_drink))
///         .with_state(gate)
/// }
/// ```
#[macro_export]
macro_rules! permission_guard {
    (@define $vis:vis $i:ident; $permission:literal; $doc:expr) => {
        #[doc = $doc]
        $vis struct $i($vis $crate::__private::Claims);

        impl $i {
            #[allow(dead_code)]
            $vis fn into_claims(self) -> $crate::__private::Claims {
                self.0
            }

            #[allow(dead_code)]
            $vis fn claims(&self) -> &$crate::__private::Claims {
                &self.0
            }
        }

        impl ::std::fmt::Debug for $i {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($i)).field(&self.0).finish()
            }
        }

        impl $crate::EndpointPermission for $i {
            const PERMISSION: &'static str = $permission;
        }

        #[::axum::async_trait]
        impl<S> ::axum::extract::FromRequestParts<S> for $i
        where
            S: Send + Sync,
            $crate::__private::Gate: ::axum::extract::FromRef<S>,
        {
            type Rejection = $crate::AuthRejection;

            async fn from_request_parts(
                parts: &mut ::axum::http::request::Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                let gate =
                    <$crate::__private::Gate as ::axum::extract::FromRef<S>>::from_ref(state);
                $crate::__private::authorize(
                    &gate,
                    parts,
                    <Self as $crate::EndpointPermission>::PERMISSION,
                )
                .await
                .map(Self)
            }
        }
    };
    ($vis:vis $i:ident; *) => {
        $crate::permission_guard!(
            @define $vis $i; "";
            "Admits any caller presenting a valid token with a permission list"
        );
    };
    ($vis:vis $i:ident; $permission:literal) => {
        $crate::permission_guard!(
            @define $vis $i; $permission;
            concat!("Admits callers holding the `", $permission, "` permission")
        );
    };
}

/// Convenience macro for services that need to define many guards.
///
/// ```
/// use barista_axum::permission_guards;
///
/// permission_guards! {
///     pub permission GetDrinksDetail = "get:drinks-detail";
///     pub permission PostDrinks = "post:drinks";
///     permission AnyCaller = *;
/// }
/// ```
#[macro_export]
macro_rules! permission_guards {
    ($($vis:vis permission $i:ident = $permission:tt);* $(;)?) => {
        $(
            $crate::permission_guard!($vis $i; $permission);
        )*
    };
}

//! Execution context for backend calls.
//!
//! Every request runs under the caller's [`Principal`]. Store calls run
//! under [`Principal::System`] for exactly as long as the call's future is
//! being polled: the principal lives in a tokio task-local, and
//! [`stashed`] installs the system principal with a scope that is undone
//! after every poll, on completion, on error, and when the future is dropped.
//! The caller's principal is therefore always back in place by the time the
//! orchestrator resumes.

use std::future::Future;

/// Identity under which a piece of work executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// No caller identity was established.
    Anonymous,
    /// A named end user.
    User(String),
    /// Internal identity used for store access.
    System,
}

tokio::task_local! {
    static PRINCIPAL: Principal;
}

/// The principal of the currently executing scope.
pub fn current_principal() -> Principal {
    PRINCIPAL
        .try_with(Principal::clone)
        .unwrap_or(Principal::Anonymous)
}

/// Run `fut` on behalf of `principal`.
pub async fn as_caller<F: Future>(principal: Principal, fut: F) -> F::Output {
    PRINCIPAL.scope(principal, fut).await
}

/// Run a backend call under the system principal, restoring the caller's afterwards.
pub async fn stashed<F: Future>(fut: F) -> F::Output {
    PRINCIPAL.scope(Principal::System, fut).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_principal_is_anonymous() {
        assert_eq!(current_principal(), Principal::Anonymous);
    }

    #[tokio::test]
    async fn test_stashed_elevates_then_restores() {
        let alice = Principal::User("alice".to_string());
        as_caller(alice.clone(), async {
            assert_eq!(current_principal(), alice);

            let inside = stashed(async { current_principal() }).await;
            assert_eq!(inside, Principal::System);

            assert_eq!(current_principal(), alice);
        })
        .await;
    }

    #[tokio::test]
    async fn test_stashed_restores_after_error() {
        let bob = Principal::User("bob".to_string());
        as_caller(bob.clone(), async {
            let result: Result<(), String> = stashed(async {
                assert_eq!(current_principal(), Principal::System);
                Err("backend down".to_string())
            })
            .await;
            assert!(result.is_err());
            assert_eq!(current_principal(), bob);
        })
        .await;
    }

    #[tokio::test]
    async fn test_stashed_does_not_leak_across_await_points() {
        let carol = Principal::User("carol".to_string());
        as_caller(carol.clone(), async {
            stashed(async {
                tokio::task::yield_now().await;
                assert_eq!(current_principal(), Principal::System);
            })
            .await;
            tokio::task::yield_now().await;
            assert_eq!(current_principal(), carol);
        })
        .await;
    }

    #[tokio::test]
    async fn test_dropped_stash_leaves_caller_untouched() {
        let dave = Principal::User("dave".to_string());
        as_caller(dave.clone(), async {
            let pending = stashed(std::future::pending::<()>());
            let timed_out =
                tokio::time::timeout(std::time::Duration::from_millis(10), pending).await;
            assert!(timed_out.is_err());
            assert_eq!(current_principal(), dave);
        })
        .await;
    }
}

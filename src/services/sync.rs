//! Directory sync: crawl the external directory and reconcile candidates
//! into the identity store.
//!
//! Reconciliation is additive and corrective only: identities absent from a
//! crawl are never deleted, so a partial upstream failure can never cause
//! local data loss.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    config::DirectoryConfig,
    directory::{self, Candidate, DirectorySource},
    error::AppResult,
    models::User,
    repository::{users::UsersRepository, Repository},
};

/// Aggregate result of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SyncStats {
    pub total: u64,
    pub created: u64,
    pub updated: u64,
}

/// Identity store operations the reconciler needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn create_borrower(&self, candidate: &Candidate) -> AppResult<()>;
    async fn update_name(&self, id: i32, first_name: &str, last_name: &str) -> AppResult<()>;
}

#[async_trait]
impl IdentityStore for UsersRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.get_by_username(username).await
    }

    async fn create_borrower(&self, candidate: &Candidate) -> AppResult<()> {
        UsersRepository::create_borrower(
            self,
            &candidate.username,
            &candidate.first_name,
            &candidate.last_name,
            &candidate.email,
        )
        .await?;
        Ok(())
    }

    async fn update_name(&self, id: i32, first_name: &str, last_name: &str) -> AppResult<()> {
        UsersRepository::update_name(self, id, first_name, last_name).await
    }
}

/// Merge crawl candidates into the identity store.
///
/// Unknown handles become new borrower identities without a usable
/// credential; known handles only get their name corrected when the
/// directory supplies a materially different one. Store errors on a single
/// candidate are logged and skipped.
pub async fn reconcile(store: &dyn IdentityStore, candidates: &[Candidate]) -> SyncStats {
    let mut stats = SyncStats::default();

    for candidate in candidates {
        let result = async {
            match store.find_by_username(&candidate.username).await? {
                Some(user) => {
                    if user.first_name != candidate.first_name
                        || user.last_name != candidate.last_name
                    {
                        store
                            .update_name(user.id, &candidate.first_name, &candidate.last_name)
                            .await?;
                        stats.updated += 1;
                    }
                }
                None => {
                    store.create_borrower(candidate).await?;
                    stats.created += 1;
                }
            }
            stats.total += 1;
            Ok::<_, crate::AppError>(())
        }
        .await;

        if let Err(e) = result {
            tracing::error!("Error reconciling candidate {}: {}", candidate.username, e);
        }
    }

    tracing::info!(
        "Reconciliation completed: processed {}, created {}, updated {}",
        stats.total,
        stats.created,
        stats.updated
    );

    stats
}

/// One full directory sync run: crawl, then reconcile
#[derive(Clone)]
pub struct SyncService {
    repository: Repository,
    source: Arc<dyn DirectorySource>,
    config: DirectoryConfig,
}

impl SyncService {
    pub fn new(
        repository: Repository,
        source: Arc<dyn DirectorySource>,
        config: DirectoryConfig,
    ) -> Self {
        Self {
            repository,
            source,
            config,
        }
    }

    pub async fn run(&self) -> AppResult<SyncStats> {
        tracing::info!("Starting directory sync");

        let outcome = directory::crawl(
            self.source.as_ref(),
            &self.config.programs,
            &self.config.email_domain,
        )
        .await?;

        Ok(reconcile(&self.repository.users, &outcome.candidates).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;

    use crate::models::user::Role;

    fn candidate(username: &str, first: &str, last: &str) -> Candidate {
        Candidate {
            username: username.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}@example.edu", username),
        }
    }

    fn existing_user(id: i32, username: &str, first: &str, last: &str) -> User {
        User {
            id,
            username: username.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}@example.edu", username),
            role: Role::Borrower,
            password_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_run_creates_all_unknown_candidates() {
        let mut store = MockIdentityStore::new();
        store.expect_find_by_username().returning(|_| Ok(None));
        store.expect_create_borrower().times(2).returning(|_| Ok(()));

        let candidates = vec![
            candidate("mt1230001", "Asha", "Verma"),
            candidate("mt1230002", "Ravi", "Kumar Singh"),
        ];

        let stats = reconcile(&store, &candidates).await;
        assert_eq!(
            stats,
            SyncStats {
                total: 2,
                created: 2,
                updated: 0
            }
        );
    }

    #[tokio::test]
    async fn second_run_updates_only_changed_names() {
        let mut store = MockIdentityStore::new();
        store
            .expect_find_by_username()
            .with(eq("mt1230001"))
            .returning(|_| Ok(Some(existing_user(1, "mt1230001", "Asha", "Verma"))));
        store
            .expect_find_by_username()
            .with(eq("mt1230002"))
            .returning(|_| Ok(Some(existing_user(2, "mt1230002", "Ravi", "Kumar"))));
        store
            .expect_update_name()
            .with(eq(2), eq("Ravi"), eq("Kumar Singh"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let candidates = vec![
            candidate("mt1230001", "Asha", "Verma"),
            candidate("mt1230002", "Ravi", "Kumar Singh"),
        ];

        let stats = reconcile(&store, &candidates).await;
        assert_eq!(
            stats,
            SyncStats {
                total: 2,
                created: 0,
                updated: 1
            }
        );
    }

    #[tokio::test]
    async fn store_error_on_one_candidate_does_not_abort_the_rest() {
        let mut store = MockIdentityStore::new();
        store.expect_find_by_username().returning(|_| Ok(None));
        store
            .expect_create_borrower()
            .withf(|c| c.username == "broken")
            .returning(|_| Err(crate::AppError::Internal("constraint".to_string())));
        store
            .expect_create_borrower()
            .withf(|c| c.username != "broken")
            .returning(|_| Ok(()));

        let candidates = vec![
            candidate("broken", "X", "Y"),
            candidate("mt1230003", "Neha", "Gupta"),
        ];

        let stats = reconcile(&store, &candidates).await;
        assert_eq!(
            stats,
            SyncStats {
                total: 1,
                created: 1,
                updated: 0
            }
        );
    }
}

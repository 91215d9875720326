//! Service tests against an in-memory `SqliteStore`.

use std::sync::Arc;

use chrono::{Datelike as _, Duration, NaiveDate, Utc};
use roster_core::{
  Error,
  account::{NewAccount, ProfileChanges},
  store::AccountStore,
};
use roster_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{
  CredentialHasher, Services, Sha256Hasher, SigningKey, TokenAuthority, bootstrap,
  token::TOKEN_LIFETIME,
};

struct Harness {
  store:       Arc<SqliteStore>,
  tokens:      Arc<TokenAuthority>,
  svc:         Services<SqliteStore>,
  admin_token: String,
}

async fn harness() -> Harness {
  let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
  let tokens = Arc::new(TokenAuthority::new(&SigningKey::new("test-secret").unwrap()));
  let hasher: Arc<dyn CredentialHasher> = Arc::new(Sha256Hasher);

  bootstrap::ensure_admin(&*store, &*hasher, "root", "rootpass1")
    .await
    .unwrap();

  let svc = Services::new(store.clone(), tokens.clone(), hasher);
  let admin_token = svc.sign_in.sign_in("root", "rootpass1").await.unwrap();
  Harness { store, tokens, svc, admin_token }
}

fn new_account(login: &str) -> NewAccount {
  NewAccount {
    login:    login.into(),
    password: "password1".into(),
    name:     "Test User".into(),
    gender:   1,
    birthday: None,
    is_admin: false,
  }
}

impl Harness {
  /// Create an ordinary account and return a token for it.
  async fn user(&self, login: &str) -> String {
    self.svc.admin.create(&self.admin_token, new_account(login)).await.unwrap();
    self.svc.sign_in.sign_in(login, "password1").await.unwrap()
  }
}

// ─── Sign-in ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_in_issues_token_with_account_claims() {
  let h = harness().await;
  let root = h.store.find_by_login("root").await.unwrap().unwrap();

  let claims = h.tokens.extract_claims(&h.admin_token).unwrap();
  assert_eq!(claims.subject_id, root.account_id);
  assert_eq!(claims.login, "root");
  assert!(claims.is_admin);
  assert!(h.tokens.validate(&h.admin_token));
}

#[tokio::test]
async fn sign_in_rejections_are_indistinguishable() {
  let h = harness().await;
  h.user("alice").await;
  h.svc.admin.soft_delete(&h.admin_token, "alice").await.unwrap();

  for (login, password) in [("ghost", "password1"), ("root", "wrongpass1"), ("alice", "password1")] {
    let err = h.svc.sign_in.sign_in(login, password).await.unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials), "{login}: {err:?}");
  }
}

// ─── Authorization gate ──────────────────────────────────────────────────────

#[tokio::test]
async fn admin_operations_require_valid_admin_token() {
  let h = harness().await;
  let user_token = h.user("alice").await;

  let err = h.svc.admin.list_active(&user_token).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden));

  let err = h.svc.admin.list_active("garbage").await.unwrap_err();
  assert!(matches!(err, Error::NotAuthenticated));

  let root = h.store.find_by_login("root").await.unwrap().unwrap();
  let expired = h
    .tokens
    .issue_at(root.account_id, "root", true, Utc::now() - TOKEN_LIFETIME - Duration::seconds(1))
    .unwrap();
  let err = h.svc.admin.list_active(&expired).await.unwrap_err();
  assert!(matches!(err, Error::NotAuthenticated));
}

#[tokio::test]
async fn foreign_signed_admin_token_is_not_authenticated() {
  let h = harness().await;
  let other = TokenAuthority::new(&SigningKey::new("other-secret").unwrap());
  let forged = other.issue(Uuid::new_v4(), "root", true).unwrap();
  let err = h.svc.admin.get_by_login(&forged, "root").await.unwrap_err();
  assert!(matches!(err, Error::NotAuthenticated));
}

// ─── Create / lookup ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_rejects_bad_login_and_accepts_cyrillic_name() {
  let h = harness().await;

  let mut bad = new_account("ab#1");
  bad.password = "abcdef12".into();
  let err = h.svc.admin.create(&h.admin_token, bad).await.unwrap_err();
  assert!(matches!(err, Error::InvalidInput(m) if m.contains("login")));

  let good = NewAccount {
    login:    "ab1".into(),
    password: "abcdef12".into(),
    name:     "Иван".into(),
    gender:   1,
    birthday: None,
    is_admin: false,
  };
  h.svc.admin.create(&h.admin_token, good).await.unwrap();

  let view = h.svc.admin.get_by_login(&h.admin_token, "ab1").await.unwrap();
  assert_eq!(view.name, "Иван");
  assert_eq!(view.gender, 1);
  assert!(view.birthday.is_none());
  assert!(view.is_active);
  assert_eq!(view.created_by, "root");
  assert_eq!(view.modified_by, "root");

  let by_id = h.svc.admin.get_by_id(&h.admin_token, view.account_id).await.unwrap();
  assert_eq!(by_id, view);
}

#[tokio::test]
async fn create_validates_every_field() {
  let h = harness().await;

  let mut a = new_account("bob");
  a.password = "short1".into();
  assert!(matches!(
    h.svc.admin.create(&h.admin_token, a).await,
    Err(Error::InvalidInput(m)) if m.contains("password")
  ));

  let mut a = new_account("bob");
  a.name = "B0b".into();
  assert!(matches!(
    h.svc.admin.create(&h.admin_token, a).await,
    Err(Error::InvalidInput(m)) if m.contains("name")
  ));

  let mut a = new_account("bob");
  a.gender = 3;
  assert!(matches!(
    h.svc.admin.create(&h.admin_token, a).await,
    Err(Error::InvalidInput(m)) if m.contains("gender")
  ));

  let mut a = new_account("bob");
  a.birthday = NaiveDate::from_ymd_opt(10000, 1, 1);
  assert!(matches!(
    h.svc.admin.create(&h.admin_token, a).await,
    Err(Error::InvalidInput(m)) if m.contains("birthday")
  ));

  assert!(h.store.find_by_login("bob").await.unwrap().is_none());

  let token = h.user("carol").await;
  let changes = ProfileChanges { birthday: NaiveDate::from_ymd_opt(-1, 1, 1), ..Default::default() };
  assert!(matches!(
    h.svc.own.update_profile(&token, changes).await,
    Err(Error::InvalidInput(_))
  ));
}

#[tokio::test]
async fn create_duplicate_login_is_already_exists() {
  let h = harness().await;
  h.user("alice").await;
  let err = h.svc.admin.create(&h.admin_token, new_account("alice")).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyExists(_)));
}

#[tokio::test]
async fn lookups_of_missing_accounts_are_not_found() {
  let h = harness().await;
  assert!(matches!(
    h.svc.admin.get_by_login(&h.admin_token, "ghost").await,
    Err(Error::NotFound(_))
  ));
  assert!(matches!(
    h.svc.admin.get_by_id(&h.admin_token, Uuid::new_v4()).await,
    Err(Error::NotFound(_))
  ));
}

// ─── Rename ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rename_to_same_login_leaves_audit_fields_alone() {
  let h = harness().await;
  h.user("alice").await;
  let before = h.svc.admin.get_by_login(&h.admin_token, "alice").await.unwrap();

  h.svc.admin.rename(&h.admin_token, "alice", "alice").await.unwrap();

  let after = h.svc.admin.get_by_login(&h.admin_token, "alice").await.unwrap();
  assert_eq!(before.modified_on, after.modified_on);
  assert_eq!(before.modified_by, after.modified_by);
}

#[tokio::test]
async fn rename_onto_taken_login_changes_nothing() {
  let h = harness().await;
  h.user("alice").await;
  h.user("bob").await;
  let alice = h.store.find_by_login("alice").await.unwrap().unwrap();
  let bob = h.store.find_by_login("bob").await.unwrap().unwrap();

  let err = h.svc.admin.rename(&h.admin_token, "alice", "bob").await.unwrap_err();
  assert!(matches!(err, Error::AlreadyExists(l) if l == "bob"));

  assert_eq!(h.store.find_by_id(alice.account_id).await.unwrap().unwrap(), alice);
  assert_eq!(h.store.find_by_id(bob.account_id).await.unwrap().unwrap(), bob);
}

#[tokio::test]
async fn rename_validates_and_resolves() {
  let h = harness().await;
  h.user("alice").await;

  assert!(matches!(
    h.svc.admin.rename(&h.admin_token, "alice", "al ice").await,
    Err(Error::InvalidInput(_))
  ));
  assert!(matches!(
    h.svc.admin.rename(&h.admin_token, "ghost", "ghost2").await,
    Err(Error::NotFound(_))
  ));

  h.svc.admin.rename(&h.admin_token, "alice", "alice2").await.unwrap();
  let view = h.svc.admin.get_by_login(&h.admin_token, "alice2").await.unwrap();
  assert_eq!(view.modified_by, "root");
  assert!(h.store.find_by_login("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn revoked_login_stays_reserved() {
  let h = harness().await;
  h.user("alice").await;
  h.user("bob").await;
  h.svc.admin.soft_delete(&h.admin_token, "alice").await.unwrap();

  let err = h.svc.admin.rename(&h.admin_token, "bob", "alice").await.unwrap_err();
  assert!(matches!(err, Error::AlreadyExists(_)));
}

// ─── Password reset / profile ────────────────────────────────────────────────

#[tokio::test]
async fn reset_password_overrides_without_old_password() {
  let h = harness().await;
  h.user("alice").await;

  assert!(matches!(
    h.svc.admin.reset_password(&h.admin_token, "alice", "nope").await,
    Err(Error::InvalidInput(_))
  ));
  assert!(matches!(
    h.svc.admin.reset_password(&h.admin_token, "ghost", "newpass12").await,
    Err(Error::NotFound(_))
  ));

  h.svc.admin.reset_password(&h.admin_token, "alice", "newpass12").await.unwrap();
  assert!(h.svc.sign_in.sign_in("alice", "newpass12").await.is_ok());
  assert!(h.svc.sign_in.sign_in("alice", "password1").await.is_err());
}

#[tokio::test]
async fn admin_profile_update_bumps_audit_only_on_change() {
  let h = harness().await;
  h.user("alice").await;
  let before = h.store.find_by_login("alice").await.unwrap().unwrap();

  let same = ProfileChanges { name: Some("Test User".into()), gender: Some(1), birthday: None };
  h.svc.admin.update_profile(&h.admin_token, "alice", same).await.unwrap();
  assert_eq!(h.store.find_by_login("alice").await.unwrap().unwrap(), before);

  let bad = ProfileChanges { gender: Some(-1), ..Default::default() };
  assert!(matches!(
    h.svc.admin.update_profile(&h.admin_token, "alice", bad).await,
    Err(Error::InvalidInput(_))
  ));

  let birthday = NaiveDate::from_ymd_opt(1980, 7, 4).unwrap();
  let real = ProfileChanges { name: Some("Alice Liddell".into()), gender: None, birthday: Some(birthday) };
  h.svc.admin.update_profile(&h.admin_token, "alice", real).await.unwrap();

  let after = h.store.find_by_login("alice").await.unwrap().unwrap();
  assert_eq!(after.name, "Alice Liddell");
  assert_eq!(after.birthday, Some(birthday));
  assert!(after.modified_on > before.modified_on);
}

#[tokio::test]
async fn rejected_profile_update_writes_nothing() {
  let h = harness().await;
  h.user("alice").await;
  let before = h.store.find_by_login("alice").await.unwrap().unwrap();

  let mixed = ProfileChanges { name: Some("Valid Name".into()), gender: Some(9), birthday: None };
  assert!(h.svc.admin.update_profile(&h.admin_token, "alice", mixed).await.is_err());
  assert_eq!(h.store.find_by_login("alice").await.unwrap().unwrap(), before);
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_active_excludes_revoked_in_creation_order() {
  let h = harness().await;
  h.user("alice").await;
  h.user("bob").await;
  h.user("carol").await;
  h.svc.admin.soft_delete(&h.admin_token, "bob").await.unwrap();

  let logins: Vec<String> = h
    .svc
    .admin
    .list_active(&h.admin_token)
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.login)
    .collect();
  assert_eq!(logins, vec!["root", "alice", "carol"]);
}

#[tokio::test]
async fn list_older_than_is_strict_and_needs_birthday() {
  let h = harness().await;
  let year = Utc::now().year();

  for (login, birth_year) in [("older", Some(year - 31)), ("exact", Some(year - 30)), ("younger", Some(year - 5)), ("unknown", None)] {
    let mut a = new_account(login);
    a.birthday = birth_year.and_then(|y| NaiveDate::from_ymd_opt(y, 6, 15));
    h.svc.admin.create(&h.admin_token, a).await.unwrap();
  }

  let found = h.svc.admin.list_older_than(&h.admin_token, 30).await.unwrap();
  let logins: Vec<&str> = found.iter().map(|v| v.login.as_str()).collect();
  assert_eq!(logins, vec!["older"]);

  for years in [0, -3] {
    assert!(matches!(
      h.svc.admin.list_older_than(&h.admin_token, years).await,
      Err(Error::InvalidInput(_))
    ));
  }
}

// ─── Soft-delete / restore ───────────────────────────────────────────────────

#[tokio::test]
async fn revoked_account_is_locked_out_of_self_service_but_visible_to_admin() {
  let h = harness().await;
  let token = h.user("alice").await;
  h.svc.admin.soft_delete(&h.admin_token, "alice").await.unwrap();

  let view = h.svc.admin.get_by_login(&h.admin_token, "alice").await.unwrap();
  assert!(!view.is_active);
  assert_eq!(view.revoked_by.as_deref(), Some("root"));

  let changes = ProfileChanges { name: Some("New Name".into()), ..Default::default() };
  assert!(matches!(h.svc.own.update_profile(&token, changes).await, Err(Error::AccountRevoked(_))));
  assert!(matches!(
    h.svc.own.change_password(&token, "password1", "password2").await,
    Err(Error::AccountRevoked(_))
  ));
  assert!(matches!(h.svc.own.change_login(&token, "alice9").await, Err(Error::AccountRevoked(_))));
  assert!(matches!(
    h.svc.own.get_own_data(&token, "alice", "password1").await,
    Err(Error::AccountRevoked(_))
  ));

  // Administrators can still manage the record.
  h.svc.admin.reset_password(&h.admin_token, "alice", "password2").await.unwrap();
  h.svc.admin.rename(&h.admin_token, "alice", "alice9").await.unwrap();
  assert!(matches!(
    h.svc.admin.soft_delete(&h.admin_token, "ghost").await,
    Err(Error::NotFound(_))
  ));
}

#[tokio::test]
async fn restore_reactivates_and_is_idempotent() {
  let h = harness().await;
  let token = h.user("alice").await;

  // Never revoked: still succeeds.
  h.svc.admin.restore(&h.admin_token, "alice").await.unwrap();

  h.svc.admin.soft_delete(&h.admin_token, "alice").await.unwrap();
  h.svc.admin.soft_delete(&h.admin_token, "alice").await.unwrap();
  h.svc.admin.restore(&h.admin_token, "alice").await.unwrap();

  let account = h.store.find_by_login("alice").await.unwrap().unwrap();
  assert!(account.revoked_on.is_none());
  assert!(account.revoked_by.is_none());

  h.svc.own.change_login(&token, "alice2").await.unwrap();
  assert!(matches!(
    h.svc.admin.restore(&h.admin_token, "ghost").await,
    Err(Error::NotFound(_))
  ));
}

// ─── Self-service ────────────────────────────────────────────────────────────

#[tokio::test]
async fn change_password_checks_new_format_before_old_password() {
  let h = harness().await;
  let token = h.user("alice").await;

  assert!(matches!(
    h.svc.own.change_password(&token, "password1", "short").await,
    Err(Error::InvalidInput(_))
  ));
  assert!(matches!(
    h.svc.own.change_password(&token, "wrongpass", "password2").await,
    Err(Error::WrongPassword)
  ));

  h.svc.own.change_password(&token, "password1", "password2").await.unwrap();
  assert!(h.svc.sign_in.sign_in("alice", "password2").await.is_ok());

  let account = h.store.find_by_login("alice").await.unwrap().unwrap();
  assert_eq!(account.modified_by, "alice");
}

#[tokio::test]
async fn change_login_rules() {
  let h = harness().await;
  let token = h.user("alice").await;
  h.user("bob").await;
  let before = h.store.find_by_login("alice").await.unwrap().unwrap();

  h.svc.own.change_login(&token, "alice").await.unwrap();
  assert_eq!(h.store.find_by_login("alice").await.unwrap().unwrap(), before);

  assert!(matches!(h.svc.own.change_login(&token, "bob").await, Err(Error::AlreadyExists(_))));
  assert!(matches!(h.svc.own.change_login(&token, "b-o-b").await, Err(Error::InvalidInput(_))));

  h.svc.own.change_login(&token, "alicia").await.unwrap();
  let renamed = h.store.find_by_id(before.account_id).await.unwrap().unwrap();
  assert_eq!(renamed.login, "alicia");
  // The actor is the login the caller signed in with.
  assert_eq!(renamed.modified_by, "alice");

  // The token is bound to the id, not the login, so it keeps working.
  h.svc.own.change_login(&token, "alice").await.unwrap();
}

#[tokio::test]
async fn self_service_audit_actor_is_token_login() {
  let h = harness().await;
  let token = h.user("alice").await;
  h.svc.own.change_login(&token, "alicia").await.unwrap();

  let changes = ProfileChanges { name: Some("Alicia".into()), ..Default::default() };
  h.svc.own.update_profile(&token, changes).await.unwrap();
  let account = h.store.find_by_login("alicia").await.unwrap().unwrap();
  assert_eq!(account.modified_by, "alice");

  let fresh = h.svc.sign_in.sign_in("alicia", "password1").await.unwrap();
  h.svc.own.change_password(&fresh, "password1", "password2").await.unwrap();
  let account = h.store.find_by_login("alicia").await.unwrap().unwrap();
  assert_eq!(account.modified_by, "alicia");
}

#[tokio::test]
async fn admin_may_use_self_service_on_own_account() {
  let h = harness().await;
  let changes = ProfileChanges { gender: Some(2), ..Default::default() };
  h.svc.own.update_profile(&h.admin_token, changes).await.unwrap();
  assert_eq!(h.store.find_by_login("root").await.unwrap().unwrap().gender, 2);
}

#[tokio::test]
async fn self_service_for_unknown_subject_is_not_found() {
  let h = harness().await;
  let orphan = h.tokens.issue(Uuid::new_v4(), "ghost", false).unwrap();
  assert!(matches!(
    h.svc.own.update_profile(&orphan, ProfileChanges::default()).await,
    Err(Error::NotFound(_))
  ));
}

#[tokio::test]
async fn get_own_data_reauthenticates_by_login() {
  let h = harness().await;
  let token = h.user("alice").await;
  h.user("bob").await;

  let profile = h.svc.own.get_own_data(&token, "alice", "password1").await.unwrap();
  assert_eq!(profile.login, "alice");
  assert_eq!(profile.name, "Test User");

  // Any authenticated caller who knows the credentials may read.
  let bob = h.svc.own.get_own_data(&token, "bob", "password1").await.unwrap();
  assert_eq!(bob.login, "bob");

  assert!(matches!(
    h.svc.own.get_own_data(&token, "alice", "nottheone").await,
    Err(Error::WrongPassword)
  ));
  assert!(matches!(
    h.svc.own.get_own_data(&token, "ghost", "password1").await,
    Err(Error::NotFound(_))
  ));
  assert!(matches!(
    h.svc.own.get_own_data("garbage", "alice", "password1").await,
    Err(Error::NotAuthenticated)
  ));
}

// ─── Bootstrap ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn bootstrap_is_idempotent() {
  let h = harness().await;
  let created = bootstrap::ensure_admin(&*h.store, &Sha256Hasher, "root", "rootpass1")
    .await
    .unwrap();
  assert!(!created);

  assert!(matches!(
    bootstrap::ensure_admin(&*h.store, &Sha256Hasher, "root", "weak").await,
    Err(Error::InvalidInput(_))
  ));
}

//! Principals, rules, and the permission evaluator.
//!
//! An access control list is an ordered `Vec<Rule>`. Evaluation walks it from
//! the front and the first rule matching both the principal and the action
//! decides. Every list built here ends in [`Rule::deny_all`], so anything not
//! explicitly allowed is denied.
//!
//! Rule lists are derived on demand from the current state of a resource and
//! are never stored.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ─── Principal ───────────────────────────────────────────────────────────────

/// An identity against which access is checked: a user, a group's members,
/// or one of the well-known system principals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
  const AUTHENTICATED: &'static str = "system.Authenticated";
  const EVERYONE: &'static str = "system.Everyone";

  pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

  /// Held by every requester, authenticated or not.
  pub fn everyone() -> Self { Self::new(Self::EVERYONE) }

  /// Held by every requester with a verified identity.
  pub fn authenticated() -> Self { Self::new(Self::AUTHENTICATED) }

  /// A user principal is the userid itself, e.g. `acct:alice@example.com`.
  pub fn user(userid: &str) -> Self { Self::new(userid) }

  /// Held by members of the group with the given pubid.
  pub fn group(pubid: &str) -> Self { Self(format!("group:{pubid}")) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Principal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Action / Effect ─────────────────────────────────────────────────────────

/// An operation a requester wants to perform on a resource.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
  Read,
  Flag,
  Moderate,
  Admin,
  Update,
  Delete,
}

impl Action {
  /// Actions a shared resource delegates to its group.
  pub const GROUP_DERIVED: [Action; 3] = [Action::Read, Action::Flag, Action::Moderate];
  /// Actions the owner of a resource always holds.
  pub const OWNER_ONLY: [Action; 3] = [Action::Admin, Action::Update, Action::Delete];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
  Allow,
  Deny,
}

// ─── Rule ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalMatcher {
  Is(Principal),
  /// Matches every principal.
  Any,
}

impl PrincipalMatcher {
  pub fn accepts(&self, principal: &Principal) -> bool {
    match self {
      Self::Is(p) => p == principal,
      Self::Any => true,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionMatcher {
  Is(Action),
  /// Matches every action.
  Any,
}

impl ActionMatcher {
  pub fn accepts(&self, action: Action) -> bool {
    match self {
      Self::Is(a) => *a == action,
      Self::Any => true,
    }
  }
}

/// One `(effect, principal, action)` entry of an access control list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
  pub effect:    Effect,
  pub principal: PrincipalMatcher,
  pub action:    ActionMatcher,
}

impl Rule {
  pub fn allow(principal: Principal, action: Action) -> Self {
    Self {
      effect:    Effect::Allow,
      principal: PrincipalMatcher::Is(principal),
      action:    ActionMatcher::Is(action),
    }
  }

  pub fn deny(principal: Principal, action: Action) -> Self {
    Self {
      effect:    Effect::Deny,
      principal: PrincipalMatcher::Is(principal),
      action:    ActionMatcher::Is(action),
    }
  }

  /// `(Deny, *, *)`: nobody may do anything.
  pub fn deny_all() -> Self {
    Self {
      effect:    Effect::Deny,
      principal: PrincipalMatcher::Any,
      action:    ActionMatcher::Any,
    }
  }

  pub fn matches(&self, principal: &Principal, action: Action) -> bool {
    self.principal.accepts(principal) && self.action.accepts(action)
  }
}

// ─── Subjects and group roles ────────────────────────────────────────────────

/// A resource whose rule list depends on ownership and sharing.
pub trait AccessSubject {
  /// The principal that created the resource.
  fn owner(&self) -> Principal;
  /// Whether permissions are delegated to the owning group.
  fn is_shared(&self) -> bool;
  fn is_deleted(&self) -> bool;
  /// Pubid of the owning group.
  fn group_id(&self) -> &str;
}

/// Resolves the principals holding a role within a group.
///
/// Must never fail: an unknown group resolves to no principals.
pub trait GroupRoleResolver {
  fn principals_for(&self, group_id: &str, action: Action) -> Vec<Principal>;
}

impl<G: GroupRoleResolver + ?Sized> GroupRoleResolver for &G {
  fn principals_for(&self, group_id: &str, action: Action) -> Vec<Principal> {
    (**self).principals_for(group_id, action)
  }
}

impl<G: GroupRoleResolver> GroupRoleResolver for Option<G> {
  fn principals_for(&self, group_id: &str, action: Action) -> Vec<Principal> {
    match self {
      Some(group) => group.principals_for(group_id, action),
      None => Vec::new(),
    }
  }
}

// ─── Evaluator ───────────────────────────────────────────────────────────────

/// Build the ordered rule list for `subject`.
///
/// A deleted subject gets `[deny_all]` and nothing else. A shared subject
/// takes its read, flag and moderate rules from `resolver`; a private one
/// grants them to the owner alone. The owner always holds admin, update and
/// delete, and the list always ends in a default deny.
pub fn build_rules<S, R>(subject: &S, resolver: &R) -> Vec<Rule>
where
  S: AccessSubject + ?Sized,
  R: GroupRoleResolver + ?Sized,
{
  if subject.is_deleted() {
    return vec![Rule::deny_all()];
  }

  let owner = subject.owner();
  let mut rules = Vec::new();

  if subject.is_shared() {
    for action in Action::GROUP_DERIVED {
      rules.extend(
        resolver
          .principals_for(subject.group_id(), action)
          .into_iter()
          .map(|principal| Rule::allow(principal, action)),
      );
    }
  } else {
    // Flagging or moderating one's own private resource is meaningless, but
    // it is not an authorization failure. Callers reject it themselves.
    for action in Action::GROUP_DERIVED {
      rules.push(Rule::allow(owner.clone(), action));
    }
  }

  for action in Action::OWNER_ONLY {
    rules.push(Rule::allow(owner.clone(), action));
  }

  rules.push(Rule::deny_all());
  rules
}

/// Evaluate `rules` for a requester holding every principal in `principals`.
///
/// The first rule accepting any of the principals and the action decides.
/// No matching rule means deny.
pub fn permits(rules: &[Rule], principals: &[Principal], action: Action) -> bool {
  rules
    .iter()
    .find(|rule| principals.iter().any(|p| rule.matches(p, action)))
    .is_some_and(|rule| rule.effect == Effect::Allow)
}

/// Evaluate `rules` for a single principal.
pub fn is_allowed(rules: &[Rule], principal: &Principal, action: Action) -> bool {
  permits(rules, std::slice::from_ref(principal), action)
}

/// Principals that `rules` allow to perform `action`, in rule order.
///
/// An explicit deny for a principal hides later allows for it; a deny that
/// matches any principal ends the scan.
pub fn principals_allowed(rules: &[Rule], action: Action) -> Vec<Principal> {
  let mut allowed: Vec<Principal> = Vec::new();
  let mut denied: Vec<&Principal> = Vec::new();

  for rule in rules.iter().filter(|r| r.action.accepts(action)) {
    match (&rule.effect, &rule.principal) {
      (Effect::Allow, PrincipalMatcher::Is(p)) => {
        if !denied.contains(&p) && !allowed.contains(p) {
          allowed.push(p.clone());
        }
      }
      (Effect::Deny, PrincipalMatcher::Is(p)) => denied.push(p),
      (Effect::Allow, PrincipalMatcher::Any) => {
        if !allowed.contains(&Principal::everyone()) {
          allowed.push(Principal::everyone());
        }
      }
      (Effect::Deny, PrincipalMatcher::Any) => break,
    }
  }

  allowed
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use strum::IntoEnumIterator as _;

  use super::*;

  struct Note {
    owner:   &'static str,
    shared:  bool,
    deleted: bool,
  }

  impl AccessSubject for Note {
    fn owner(&self) -> Principal { Principal::user(self.owner) }
    fn is_shared(&self) -> bool { self.shared }
    fn is_deleted(&self) -> bool { self.deleted }
    fn group_id(&self) -> &str { "abc123" }
  }

  /// Fixed role table for a single group.
  struct Roles(HashMap<Action, Vec<Principal>>);

  impl GroupRoleResolver for Roles {
    fn principals_for(&self, group_id: &str, action: Action) -> Vec<Principal> {
      if group_id != "abc123" {
        return Vec::new();
      }
      self.0.get(&action).cloned().unwrap_or_default()
    }
  }

  const OWNER: &str = "acct:owner@example.com";

  fn roles() -> Roles {
    Roles(HashMap::from([
      (Action::Read, vec![Principal::group("abc123"), Principal::user("acct:reader@example.com")]),
      (Action::Flag, vec![Principal::group("abc123")]),
      (Action::Moderate, vec![Principal::user("acct:creator@example.com")]),
    ]))
  }

  fn note(shared: bool, deleted: bool) -> Note { Note { owner: OWNER, shared, deleted } }

  #[test]
  fn deleted_subject_denies_everything() {
    for shared in [true, false] {
      let rules = build_rules(&note(shared, true), &roles());
      assert_eq!(rules, vec![Rule::deny_all()]);
      for action in Action::iter() {
        assert!(!is_allowed(&rules, &Principal::user(OWNER), action));
      }
    }
  }

  #[test]
  fn shared_subject_takes_group_roles_in_order() {
    let rules = build_rules(&note(true, false), &roles());
    assert_eq!(rules, vec![
      Rule::allow(Principal::group("abc123"), Action::Read),
      Rule::allow(Principal::user("acct:reader@example.com"), Action::Read),
      Rule::allow(Principal::group("abc123"), Action::Flag),
      Rule::allow(Principal::user("acct:creator@example.com"), Action::Moderate),
      Rule::allow(Principal::user(OWNER), Action::Admin),
      Rule::allow(Principal::user(OWNER), Action::Update),
      Rule::allow(Principal::user(OWNER), Action::Delete),
      Rule::deny_all(),
    ]);
  }

  #[test]
  fn shared_owner_gets_no_implicit_read_flag_moderate() {
    let rules = build_rules(&note(true, false), &roles());
    let owner = Principal::user(OWNER);
    for action in Action::GROUP_DERIVED {
      assert!(!is_allowed(&rules, &owner, action), "{action}");
    }
    for action in Action::OWNER_ONLY {
      assert!(is_allowed(&rules, &owner, action), "{action}");
    }
  }

  #[test]
  fn shared_owner_in_group_reads_through_group_principal() {
    let rules = build_rules(&note(true, false), &roles());
    let principals = [Principal::everyone(), Principal::user(OWNER), Principal::group("abc123")];
    assert!(permits(&rules, &principals, Action::Read));
    assert!(permits(&rules, &principals, Action::Flag));
    assert!(!permits(&rules, &principals, Action::Moderate));
  }

  #[test]
  fn private_subject_belongs_to_owner_alone() {
    let rules = build_rules(&note(false, false), &roles());
    let owner = Principal::user(OWNER);
    for action in Action::iter() {
      assert!(is_allowed(&rules, &owner, action), "{action}");
    }
    for other in [
      Principal::group("abc123"),
      Principal::user("acct:creator@example.com"),
      Principal::everyone(),
    ] {
      for action in Action::iter() {
        assert!(!is_allowed(&rules, &other, action), "{other} {action}");
      }
    }
  }

  #[test]
  fn missing_group_resolves_to_nothing() {
    let rules = build_rules(&note(true, false), &None::<Roles>);
    assert_eq!(rules.len(), 4);
    assert_eq!(rules.last(), Some(&Rule::deny_all()));
    assert!(!is_allowed(&rules, &Principal::group("abc123"), Action::Read));
  }

  #[test]
  fn first_match_wins() {
    let alice = Principal::user("acct:alice@example.com");
    let rules = vec![
      Rule::deny(alice.clone(), Action::Read),
      Rule::allow(alice.clone(), Action::Read),
      Rule::deny_all(),
    ];
    assert!(!is_allowed(&rules, &alice, Action::Read));
  }

  #[test]
  fn empty_rule_list_denies() {
    assert!(!is_allowed(&[], &Principal::everyone(), Action::Read));
  }

  #[test]
  fn principals_allowed_stops_at_deny_all() {
    let bob = Principal::user("acct:bob@example.com");
    let rules = vec![
      Rule::allow(Principal::group("g"), Action::Read),
      Rule::deny(bob.clone(), Action::Read),
      Rule::allow(bob.clone(), Action::Read),
      Rule::allow(Principal::group("g"), Action::Read),
      Rule::allow(Principal::authenticated(), Action::Flag),
      Rule::deny_all(),
      Rule::allow(Principal::everyone(), Action::Read),
    ];
    assert_eq!(principals_allowed(&rules, Action::Read), vec![Principal::group("g")]);
    assert_eq!(principals_allowed(&rules, Action::Flag), vec![Principal::authenticated()]);
    assert!(principals_allowed(&rules, Action::Moderate).is_empty());
  }

  #[test]
  fn action_names_round_trip_through_strings() {
    assert_eq!("moderate".parse::<Action>().unwrap(), Action::Moderate);
    assert_eq!(Action::Delete.to_string(), "delete");
    assert!("hide".parse::<Action>().is_err());
  }
}

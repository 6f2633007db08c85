//! End-to-end behaviour of the role engine against the in-memory store.
//!
//! Users `eve`, `bob` and `joe` are seeded with no roles. Membership is
//! checked both by id (store lookup) and by a freshly loaded record.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{Value, json};

use rolegate_auth::{GLOBAL_GROUP, MaybeUser, Roles, RolesConfig, RolesError, UserRecord, UserRef};
use rolegate_core::{ID_FIELD, ROLES_FIELD};
use rolegate_infra::{Document, DocumentCollection, Filter, FindOptions, InMemoryCollection, Projection};

const ALL_ROLES: [&str; 3] = ["admin", "editor", "user"];

type Engine = Roles<Arc<InMemoryCollection>, Arc<InMemoryCollection>>;

fn setup_with(config: RolesConfig) -> (Engine, Arc<InMemoryCollection>) {
    rolegate_observability::init_with_filter("rolegate_auth=debug");

    let users = Arc::new(InMemoryCollection::new());
    for name in ["eve", "bob", "joe"] {
        let mut doc = Document::new();
        doc.insert(ID_FIELD.to_string(), json!(name));
        doc.insert("username".to_string(), json!(name));
        users.insert(doc).unwrap();
    }
    let roles = Roles::with_config(users.clone(), Arc::new(InMemoryCollection::new()), config).unwrap();
    (roles, users)
}

fn setup() -> (Engine, Arc<InMemoryCollection>) {
    setup_with(RolesConfig::default())
}

fn load(users: &InMemoryCollection, id: &str) -> UserRecord {
    let doc = users.find_one(&Filter::eq(ID_FIELD, id), None).unwrap().unwrap();
    UserRecord::from_document(doc)
}

fn stored_roles(users: &InMemoryCollection, id: &str) -> Option<Value> {
    users
        .find_one(&Filter::eq(ID_FIELD, id), None)
        .unwrap()
        .and_then(|doc| doc.get(ROLES_FIELD).cloned())
}

/// Assert `user` holds exactly `expected` out of [`ALL_ROLES`] in `group`,
/// by id and by record.
fn assert_roles(roles: &Engine, users: &InMemoryCollection, user: &str, expected: &[&str], group: Option<&str>) {
    let record = load(users, user);
    for role in ALL_ROLES {
        let want = expected.contains(&role);
        assert_eq!(
            roles.user_is_in_role(user, role, group).unwrap(),
            want,
            "{user} by id, role {role}, group {group:?}"
        );
        assert_eq!(
            roles.user_is_in_role(&record, role, group).unwrap(),
            want,
            "{user} by record, role {role}, group {group:?}"
        );
    }
}

fn ids(found: &[UserRecord]) -> BTreeSet<String> {
    found
        .iter()
        .filter_map(|u| u.id.as_ref())
        .map(|id| id.as_str().to_string())
        .collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ─────────────────────────────────────────────────────────────
// Role catalog
// ─────────────────────────────────────────────────────────────

#[test]
fn can_create_and_delete_roles() {
    let (roles, _) = setup();
    roles.create_role("test1").unwrap();
    roles.create_role("test2").unwrap();
    assert_eq!(roles.get_all_roles().unwrap().len(), 2);

    roles.delete_role("test1").unwrap();
    let left: Vec<_> = roles.get_all_roles().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(left, vec!["test2"]);

    roles.delete_role("test2").unwrap();
    assert!(roles.get_all_roles().unwrap().is_empty());
}

#[test]
fn duplicate_role_is_rejected_once() {
    let (roles, _) = setup();
    roles.create_role("admin").unwrap();
    assert_eq!(
        roles.create_role("admin").unwrap_err(),
        RolesError::DuplicateRole("admin".to_string())
    );
    assert_eq!(roles.get_all_roles().unwrap().len(), 1);
}

#[test]
fn blank_role_names_leave_catalog_unchanged() {
    let (roles, _) = setup();
    roles.create_role("").unwrap();
    roles.create_role(None::<&str>).unwrap();
    roles.create_role(" ").unwrap();
    assert!(roles.get_all_roles().unwrap().is_empty());
}

#[test]
fn role_in_flat_use_cannot_be_deleted() {
    let (roles, _) = setup();
    roles.add_users_to_roles("eve", "admin", None).unwrap();
    assert_eq!(
        roles.delete_role("admin").unwrap_err(),
        RolesError::RoleInUse("admin".to_string())
    );
    assert_eq!(roles.get_all_roles().unwrap().len(), 1);
}

#[test]
fn role_in_grouped_use_can_still_be_deleted() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", "admin", Some("group1")).unwrap();
    roles.delete_role("admin").unwrap();
    assert!(roles.get_all_roles().unwrap().is_empty());
    assert_eq!(stored_roles(&users, "eve"), Some(json!({"group1": ["admin"]})));
}

#[test]
fn all_roles_come_back_sorted() {
    let (roles, _) = setup();
    for role in ["user", "admin", "editor"] {
        roles.create_role(role).unwrap();
    }
    let names: Vec<_> = roles.get_all_roles().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, ALL_ROLES);
}

// ─────────────────────────────────────────────────────────────
// Membership
// ─────────────────────────────────────────────────────────────

#[test]
fn unknown_and_missing_users_are_in_no_role() {
    let (roles, _) = setup();
    assert!(!roles.user_is_in_role("1", "admin", None).unwrap());
    assert!(!roles.user_is_in_role(None::<&str>, "admin", None).unwrap());
}

#[test]
fn any_of_several_roles_is_enough() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", ["admin", "user"], None).unwrap();
    let eve = load(&users, "eve");
    assert!(roles.user_is_in_role(&eve, ["editor", "admin"], None).unwrap());
    assert!(roles.user_is_in_role("eve", ["editor", "admin"], None).unwrap());
}

#[test]
fn group_roles_are_isolated() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", ["admin", "user"], Some("group1")).unwrap();
    roles.add_users_to_roles("eve", "editor", Some("group2")).unwrap();

    assert_roles(&roles, &users, "eve", &["admin", "user"], Some("group1"));
    assert_roles(&roles, &users, "eve", &["editor"], Some("group2"));
    assert_roles(&roles, &users, "eve", &[], None);
}

#[test]
fn global_roles_apply_to_every_group() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", "admin", Some(GLOBAL_GROUP)).unwrap();

    assert_roles(&roles, &users, "eve", &["admin"], None);
    assert_roles(&roles, &users, "eve", &["admin"], Some("any-group"));
}

// ─────────────────────────────────────────────────────────────
// Add
// ─────────────────────────────────────────────────────────────

#[test]
fn adding_unknown_user_creates_nothing() {
    let (roles, users) = setup();
    roles.add_users_to_roles(vec!["1"], vec!["admin"], None).unwrap();
    assert!(users.find_one(&Filter::eq(ID_FIELD, "1"), None).unwrap().is_none());
    assert_eq!(users.len(), 3);
}

#[test]
fn can_add_individual_users() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", ["admin", "user"], None).unwrap();
    assert_roles(&roles, &users, "eve", &["admin", "user"], None);
    assert_roles(&roles, &users, "bob", &[], None);

    roles.add_users_to_roles("joe", ["editor", "user"], None).unwrap();
    assert_roles(&roles, &users, "eve", &["admin", "user"], None);
    assert_roles(&roles, &users, "joe", &["editor", "user"], None);
}

#[test]
fn can_add_users_via_records() {
    let (roles, users) = setup();
    let eve = load(&users, "eve");
    let bob = load(&users, "bob");
    roles.add_users_to_roles(&eve, ["admin", "user"], None).unwrap();
    roles.add_users_to_roles(bob, "editor", None).unwrap();

    assert_roles(&roles, &users, "eve", &["admin", "user"], None);
    assert_roles(&roles, &users, "bob", &["editor"], None);
    assert_roles(&roles, &users, "joe", &[], None);
}

#[test]
fn adding_twice_is_idempotent() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", ["admin", "user"], None).unwrap();
    let once = roles.get_roles_for_user("eve", None).unwrap();
    roles.add_users_to_roles("eve", ["admin", "user"], None).unwrap();
    assert_eq!(roles.get_roles_for_user("eve", None).unwrap(), once);
    assert_eq!(once, vec!["admin", "user"]);

    roles.add_users_to_roles("bob", "admin", Some("group1")).unwrap();
    roles.add_users_to_roles("bob", "editor", Some("group1")).unwrap();
    assert_roles(&roles, &users, "bob", &["admin", "editor"], Some("group1"));
}

#[test]
fn can_add_multiple_users_by_group() {
    let (roles, users) = setup();
    roles
        .add_users_to_roles(["eve", "bob"], ["admin", "user"], Some("group1"))
        .unwrap();
    roles
        .add_users_to_roles(["bob", "joe"], ["editor", "user"], Some("group1"))
        .unwrap();
    roles
        .add_users_to_roles(["bob", "joe"], ["editor", "user"], Some("group2"))
        .unwrap();

    assert_roles(&roles, &users, "eve", &["admin", "user"], Some("group1"));
    assert_roles(&roles, &users, "bob", &["admin", "editor", "user"], Some("group1"));
    assert_roles(&roles, &users, "joe", &["editor", "user"], Some("group1"));
    assert_roles(&roles, &users, "eve", &[], Some("group2"));
    assert_roles(&roles, &users, "bob", &["editor", "user"], Some("group2"));
}

#[test]
fn added_roles_land_in_the_catalog() {
    let (roles, _) = setup();
    roles.create_role("admin").unwrap();
    roles.add_users_to_roles("eve", [" admin ", "editor", ""], None).unwrap();
    let names: Vec<_> = roles.get_all_roles().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["admin", "editor"]);
}

#[test]
fn concurrent_adds_converge_to_the_union() {
    let (roles, users) = setup();
    let roles = Arc::new(roles);

    let handles: Vec<_> = (0..16)
        .map(|t| {
            let roles = Arc::clone(&roles);
            std::thread::spawn(move || {
                (0..20)
                    .map(|i| roles.add_users_to_roles("eve", format!("role-{}", (t + i) % 21), None))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for handle in handles {
        for result in handle.join().unwrap() {
            assert_eq!(result, Ok(()));
        }
    }

    let expected: BTreeSet<String> = (0..21).map(|i| format!("role-{i}")).collect();
    let catalog: Vec<String> = roles.get_all_roles().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(catalog.len(), expected.len());
    assert_eq!(catalog.into_iter().collect::<BTreeSet<_>>(), expected);

    let held: BTreeSet<String> = roles.get_roles_for_user("eve", None).unwrap().into_iter().collect();
    assert_eq!(held, expected);
    assert_eq!(load(&users, "eve").roles.map(|r| r.roles_in_scope(None).len()), Some(21));
}

// ─────────────────────────────────────────────────────────────
// Remove
// ─────────────────────────────────────────────────────────────

#[test]
fn removing_twice_is_a_noop() {
    let (roles, users) = setup();
    roles.add_users_to_roles(["eve", "bob"], ["editor", "user"], None).unwrap();

    roles.remove_users_from_roles("eve", vec!["user"], None).unwrap();
    assert_roles(&roles, &users, "eve", &["editor"], None);
    assert_roles(&roles, &users, "bob", &["editor", "user"], None);

    roles.remove_users_from_roles("eve", vec!["user"], None).unwrap();
    assert_roles(&roles, &users, "eve", &["editor"], None);
}

#[test]
fn can_remove_by_group() {
    let (roles, users) = setup();
    roles.add_users_to_roles(["eve", "bob"], ["editor", "user"], Some("group1")).unwrap();
    roles.add_users_to_roles(["joe", "bob"], "admin", Some("group2")).unwrap();

    roles.remove_users_from_roles(["eve", "bob"], "user", Some("group1")).unwrap();
    roles.remove_users_from_roles(["joe", "bob"], "admin", Some("group2")).unwrap();

    assert_roles(&roles, &users, "eve", &["editor"], Some("group1"));
    assert_roles(&roles, &users, "bob", &["editor"], Some("group1"));
    assert_roles(&roles, &users, "bob", &[], Some("group2"));
    assert_roles(&roles, &users, "joe", &[], Some("group2"));
}

#[test]
fn removing_from_a_user_without_roles_is_harmless() {
    let (roles, users) = setup();
    roles.remove_users_from_roles("eve", "admin", Some("group1")).unwrap();
    roles.remove_users_from_roles("eve", "admin", None).unwrap();
    assert_eq!(stored_roles(&users, "eve"), None);
}

// ─────────────────────────────────────────────────────────────
// Set
// ─────────────────────────────────────────────────────────────

#[test]
fn can_set_user_roles() {
    let (roles, users) = setup();
    let eve = load(&users, "eve");
    let bob = load(&users, "bob");

    roles.set_user_roles(vec![UserRef::from("eve"), UserRef::from(&bob)], ["editor", "user"], None).unwrap();
    assert_roles(&roles, &users, "eve", &["editor", "user"], None);
    assert_roles(&roles, &users, "bob", &["editor", "user"], None);

    roles.add_users_to_roles(["bob", "joe"], "admin", None).unwrap();
    roles.set_user_roles(vec![&eve, &bob], "user", None).unwrap();
    assert_roles(&roles, &users, "eve", &["user"], None);
    assert_roles(&roles, &users, "bob", &["user"], None);
    assert_roles(&roles, &users, "joe", &["admin"], None);

    roles.set_user_roles(["joe", "bob"], Vec::<&str>::new(), None).unwrap();
    assert_roles(&roles, &users, "bob", &[], None);
    assert_roles(&roles, &users, "joe", &[], None);
    assert_eq!(stored_roles(&users, "joe"), Some(json!([])));
}

#[test]
fn set_by_group_leaves_other_groups_alone() {
    let (roles, users) = setup();
    roles.set_user_roles(["eve", "bob"], ["editor", "user"], Some("group1")).unwrap();
    roles.set_user_roles(["bob", "joe"], "admin", Some("group2")).unwrap();

    roles.set_user_roles("bob", "editor", Some("group1")).unwrap();
    assert_roles(&roles, &users, "bob", &["editor"], Some("group1"));
    assert_roles(&roles, &users, "bob", &["admin"], Some("group2"));

    roles.set_user_roles(["bob", "joe"], Vec::<&str>::new(), Some("group1")).unwrap();
    assert_roles(&roles, &users, "bob", &[], Some("group1"));
    assert_roles(&roles, &users, "bob", &["admin"], Some("group2"));
    assert_roles(&roles, &users, "eve", &["editor", "user"], Some("group1"));
}

#[test]
fn set_replaces_global_roles() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", "admin", Some(GLOBAL_GROUP)).unwrap();
    roles.set_user_roles("eve", "editor", Some(GLOBAL_GROUP)).unwrap();
    assert_roles(&roles, &users, "eve", &["editor"], Some("group1"));
    assert_roles(&roles, &users, "eve", &["editor"], None);
}

// ─────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────

#[test]
fn writes_reject_dollar_groups() {
    let (roles, _) = setup();
    for result in [
        roles.add_users_to_roles("eve", "admin", Some("$group")),
        roles.set_user_roles("eve", "admin", Some("$group")),
        roles.remove_users_from_roles("eve", "admin", Some("$group")),
    ] {
        assert!(matches!(result, Err(RolesError::InvalidGroupName(_))));
    }
    assert!(matches!(
        roles.get_users_in_role("admin", Some("$group"), None),
        Err(RolesError::InvalidGroupName(_))
    ));
}

#[test]
fn mutations_need_users_and_roles() {
    let (roles, _) = setup();
    assert_eq!(
        roles.remove_users_from_roles(None::<&str>, "admin", None).unwrap_err(),
        RolesError::MissingParameter("users")
    );
    assert_eq!(
        roles.remove_users_from_roles("eve", None::<&str>, None).unwrap_err(),
        RolesError::MissingParameter("roles")
    );
}

#[test]
fn empty_group_means_no_group() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", "admin", Some("")).unwrap();
    assert_eq!(stored_roles(&users, "eve"), Some(json!(["admin"])));
    assert!(roles.user_is_in_role("eve", "admin", Some("")).unwrap());
}

#[test]
fn periods_in_group_names_are_canonical() {
    let (roles, users) = setup();
    roles.add_users_to_roles("joe", "admin", Some("example.k12.va.us")).unwrap();
    assert_eq!(
        roles.get_roles_for_user("joe", Some("example.k12.va.us")).unwrap(),
        vec!["admin"]
    );
    assert!(roles.user_is_in_role("joe", "admin", Some("example.k12.va.us")).unwrap());
    assert_eq!(
        stored_roles(&users, "joe"),
        Some(json!({"example_k12_va_us": ["admin"]}))
    );
}

// ─────────────────────────────────────────────────────────────
// Mixed shapes
// ─────────────────────────────────────────────────────────────

#[test]
fn flat_write_onto_grouped_user_is_rejected() {
    for shape_precheck in [true, false] {
        let (roles, users) = setup_with(RolesConfig {
            shape_precheck,
            ..RolesConfig::default()
        });
        roles.add_users_to_roles("eve", "admin", Some("group1")).unwrap();

        assert_eq!(
            roles.add_users_to_roles("eve", "user", None).unwrap_err(),
            RolesError::MixingGroupAndNonGroup
        );
        assert_eq!(
            roles.remove_users_from_roles("eve", "admin", None).unwrap_err(),
            RolesError::MixingGroupAndNonGroup
        );
        assert_eq!(stored_roles(&users, "eve"), Some(json!({"group1": ["admin"]})));
    }
}

#[test]
fn grouped_write_onto_flat_user_is_rejected() {
    for shape_precheck in [true, false] {
        let (roles, users) = setup_with(RolesConfig {
            shape_precheck,
            ..RolesConfig::default()
        });
        roles.add_users_to_roles("eve", "admin", None).unwrap();

        for result in [
            roles.add_users_to_roles("eve", "user", Some("group1")),
            roles.set_user_roles("eve", "user", Some("group1")),
            roles.remove_users_from_roles("eve", "admin", Some("group1")),
        ] {
            assert_eq!(result.unwrap_err(), RolesError::MixingGroupAndNonGroup);
        }
        assert_eq!(stored_roles(&users, "eve"), Some(json!(["admin"])));
    }
}

#[test]
fn precheck_keeps_multi_user_writes_all_or_nothing() {
    let (roles, users) = setup();
    roles.add_users_to_roles("bob", "admin", Some("group1")).unwrap();

    let err = roles.add_users_to_roles(["eve", "bob"], "user", None).unwrap_err();
    assert_eq!(err, RolesError::MixingGroupAndNonGroup);
    assert_eq!(stored_roles(&users, "eve"), None);
}

#[test]
fn without_precheck_earlier_users_stay_updated() {
    let (roles, users) = setup_with(RolesConfig {
        shape_precheck: false,
        ..RolesConfig::default()
    });
    roles.add_users_to_roles("bob", "admin", Some("group1")).unwrap();

    let err = roles.add_users_to_roles(["eve", "bob"], "user", None).unwrap_err();
    assert_eq!(err, RolesError::MixingGroupAndNonGroup);
    assert_eq!(stored_roles(&users, "eve"), Some(json!(["user"])));
    assert_eq!(stored_roles(&users, "bob"), Some(json!({"group1": ["admin"]})));
}

// ─────────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────────

#[test]
fn roles_for_unknown_user_are_empty() {
    let (roles, _) = setup();
    assert!(roles.get_roles_for_user("1", None).unwrap().is_empty());
    assert!(roles.get_roles_for_user("1", Some("group1")).unwrap().is_empty());
}

#[test]
fn roles_for_user_by_id_and_record() {
    let (roles, users) = setup();
    assert!(roles.get_roles_for_user("eve", None).unwrap().is_empty());
    assert!(roles.get_roles_for_user(load(&users, "eve"), None).unwrap().is_empty());

    roles.add_users_to_roles("eve", ["admin", "user"], None).unwrap();
    assert_eq!(roles.get_roles_for_user("eve", None).unwrap(), vec!["admin", "user"]);
    assert_eq!(
        roles.get_roles_for_user(load(&users, "eve"), None).unwrap(),
        vec!["admin", "user"]
    );
    assert!(roles.get_roles_for_user("eve", Some("group1")).unwrap().is_empty());
}

#[test]
fn roles_for_user_fold_in_global() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", "editor", Some(GLOBAL_GROUP)).unwrap();
    assert_eq!(roles.get_roles_for_user("eve", Some("group1")).unwrap(), vec!["editor"]);
    assert_eq!(roles.get_roles_for_user("eve", None).unwrap(), vec!["editor"]);

    roles.add_users_to_roles("eve", ["admin", "user"], Some("group1")).unwrap();
    let candidates: [MaybeUser; 2] = [load(&users, "eve").into(), "eve".into()];
    for eve in candidates {
        assert_eq!(
            roles.get_roles_for_user(eve.clone(), Some("group1")).unwrap(),
            vec!["admin", "editor", "user"]
        );
        assert_eq!(roles.get_roles_for_user(eve, None).unwrap(), vec!["editor"]);
    }
}

#[test]
fn groups_for_user() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", "editor", Some("group1")).unwrap();
    roles.add_users_to_roles("eve", ["editor", "user"], Some("group2")).unwrap();
    roles
        .add_users_to_roles("eve", ["editor", "user", "admin"], Some(GLOBAL_GROUP))
        .unwrap();

    let eve = load(&users, "eve");
    assert_eq!(roles.get_groups_for_user("eve", None::<&str>).unwrap(), vec!["group1", "group2"]);
    assert_eq!(roles.get_groups_for_user(&eve, None::<&str>).unwrap(), vec!["group1", "group2"]);
    assert_eq!(roles.get_groups_for_user("eve", "user").unwrap(), vec!["group2"]);
    assert_eq!(roles.get_groups_for_user(&eve, "editor").unwrap(), vec!["group1", "group2"]);
    assert!(roles.get_groups_for_user("eve", "admin").unwrap().is_empty());
}

#[test]
fn flat_users_have_no_groups() {
    let (roles, users) = setup();
    roles.add_users_to_roles("eve", ["editor", "user"], None).unwrap();
    assert!(roles.get_groups_for_user("eve", None::<&str>).unwrap().is_empty());
    assert!(roles.get_groups_for_user(load(&users, "eve"), "editor").unwrap().is_empty());
}

#[test]
fn users_in_role() {
    let (roles, _) = setup();
    roles.add_users_to_roles(["eve", "joe"], ["admin", "user"], None).unwrap();
    roles.add_users_to_roles(["bob", "joe"], "editor", None).unwrap();

    let found = roles.get_users_in_role("admin", None, None).unwrap();
    assert_eq!(ids(&found), set(&["eve", "joe"]));
    let found = roles.get_users_in_role(["admin", "editor"], None, None).unwrap();
    assert_eq!(ids(&found), set(&["eve", "bob", "joe"]));
}

#[test]
fn users_in_role_by_group_include_global() {
    let (roles, _) = setup();
    roles.add_users_to_roles("eve", ["admin", "user"], Some(GLOBAL_GROUP)).unwrap();
    roles.add_users_to_roles(["bob", "joe"], "admin", Some("group2")).unwrap();

    assert_eq!(ids(&roles.get_users_in_role("admin", Some("group1"), None).unwrap()), set(&["eve"]));
    assert_eq!(
        ids(&roles.get_users_in_role("admin", Some("group2"), None).unwrap()),
        set(&["eve", "bob", "joe"])
    );
    assert_eq!(ids(&roles.get_users_in_role("admin", None, None).unwrap()), set(&["eve"]));
}

#[test]
fn users_in_role_forward_find_options() {
    let (roles, _) = setup();
    roles.add_users_to_roles(["eve", "joe"], ["admin", "user"], Some("group1")).unwrap();
    roles.add_users_to_roles(["bob", "joe"], "admin", Some("group2")).unwrap();

    let options = FindOptions::new().projection(Projection::exclude(["username"])).limit(1);
    let found = roles.get_users_in_role("admin", Some("group1"), Some(options)).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].id.is_some());
    assert!(!found[0].fields.contains_key("username"));
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

        /// Property: union-merge is idempotent and order-insensitive.
        #[test]
        fn merge_is_idempotent(
            first in proptest::collection::vec(prop::sample::select(ALL_ROLES.to_vec()), 0..4),
            second in proptest::collection::vec(prop::sample::select(ALL_ROLES.to_vec()), 0..4),
            group in prop::option::of(prop::sample::select(vec!["group1", "a.b", GLOBAL_GROUP])),
        ) {
            let (roles, _) = setup();
            roles.add_users_to_roles("eve", first.clone(), group).unwrap();
            roles.add_users_to_roles("eve", second.clone(), group).unwrap();
            let once = roles.get_roles_for_user("eve", group).unwrap();

            roles.add_users_to_roles("eve", second.clone(), group).unwrap();
            roles.add_users_to_roles("eve", first.clone(), group).unwrap();
            let twice = roles.get_roles_for_user("eve", group).unwrap();

            let expected: BTreeSet<String> = first.iter().chain(second.iter()).map(|r| r.to_string()).collect();
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.into_iter().collect::<BTreeSet<_>>(), expected);
        }
    }
}

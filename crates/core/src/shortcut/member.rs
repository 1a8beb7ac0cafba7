//! Member lookups

use std::collections::HashMap;

use super::models::{Group, Member};

/// Label used when a story has no owner
pub const UNASSIGNED: &str = "Unassigned";

/// Find a member id by partial, case-insensitive match on name or email
pub fn find_member_id<'a>(members: &'a [Member], needle: &str) -> Option<&'a str> {
    let needle = needle.trim().trim_start_matches('@').to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let matches = |field: &Option<String>| {
        field
            .as_deref()
            .map(|value| value.to_lowercase().contains(&needle))
            .unwrap_or(false)
    };

    members
        .iter()
        .find(|m| {
            matches(&m.profile.name)
                || matches(&m.profile.email_address)
                || matches(&m.profile.mention_name)
        })
        .map(|m| m.id.as_str())
}

/// Member id to display name
pub fn member_name_map(members: &[Member]) -> HashMap<String, String> {
    members
        .iter()
        .map(|m| (m.id.clone(), m.display_name()))
        .collect()
}

/// Owner column value: first owner's name, its raw id when unknown, or [`UNASSIGNED`]
pub fn owner_label(owner_ids: &[String], names: &HashMap<String, String>) -> String {
    match owner_ids.first() {
        Some(id) => names.get(id).cloned().unwrap_or_else(|| id.clone()),
        None => UNASSIGNED.to_string(),
    }
}

/// Names of every owner, in order
pub fn owner_labels(owner_ids: &[String], names: &HashMap<String, String>) -> Vec<String> {
    owner_ids
        .iter()
        .map(|id| names.get(id).cloned().unwrap_or_else(|| id.clone()))
        .collect()
}

/// Members belonging to a team
pub fn group_members<'a>(members: &'a [Member], group: &Group) -> Vec<&'a Member> {
    members
        .iter()
        .filter(|m| group.member_ids.contains(&m.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::models::Profile;

    fn member(id: &str, name: &str, email: &str) -> Member {
        Member {
            id: id.to_string(),
            role: Some("member".to_string()),
            disabled: false,
            profile: Profile {
                name: Some(name.to_string()),
                email_address: Some(email.to_string()),
                mention_name: Some(name.split(' ').next().unwrap().to_lowercase()),
            },
        }
    }

    fn members() -> Vec<Member> {
        vec![
            member("mem-1", "Sarah Chen", "sarah@example.com"),
            member("mem-2", "Alex Johnson", "alex@example.com"),
        ]
    }

    #[test]
    fn test_find_member_id_by_partial_name_or_email() {
        let members = members();
        assert_eq!(find_member_id(&members, "chen"), Some("mem-1"));
        assert_eq!(find_member_id(&members, "ALEX@"), Some("mem-2"));
        assert_eq!(find_member_id(&members, "@sarah"), Some("mem-1"));
        assert_eq!(find_member_id(&members, "nobody"), None);
        assert_eq!(find_member_id(&members, "  "), None);
    }

    #[test]
    fn test_owner_label() {
        let names = member_name_map(&members());
        assert_eq!(owner_label(&["mem-2".to_string()], &names), "Alex Johnson");
        assert_eq!(owner_label(&["ghost".to_string()], &names), "ghost");
        assert_eq!(owner_label(&[], &names), UNASSIGNED);
    }

    #[test]
    fn test_owner_labels() {
        let names = member_name_map(&members());
        let ids = vec!["mem-1".to_string(), "ghost".to_string()];
        assert_eq!(owner_labels(&ids, &names), vec!["Sarah Chen", "ghost"]);
    }

    #[test]
    fn test_group_members() {
        let members = members();
        let group = Group {
            id: "grp-1".to_string(),
            name: "Backend".to_string(),
            mention_name: None,
            description: None,
            member_ids: vec!["mem-2".to_string(), "mem-9".to_string()],
            color: None,
            archived: false,
            entity_type: None,
        };

        let in_group = group_members(&members, &group);
        assert_eq!(in_group.len(), 1);
        assert_eq!(in_group[0].id, "mem-2");
    }
}

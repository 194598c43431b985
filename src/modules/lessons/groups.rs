//! In-memory edits of a branch's lesson group list.
//!
//! Groups of one branch are stored as a single JSONB array, so every write is
//! read, edit here, write back.

use mashar_core::{PageRequest, generate_uid};
use mashar_models::lessons::{
    LessonGroup, LessonGroupDto, NEW_ENTITY_UID, PaginatedLessonGroupsResponse,
};

fn is_new(gid: Option<&str>) -> bool {
    match gid.map(str::trim) {
        None => true,
        Some(gid) => gid.is_empty() || gid == NEW_ENTITY_UID,
    }
}

/// Turns a submitted group into a stored one, minting a gid for new groups.
pub fn group_from_dto(dto: LessonGroupDto) -> LessonGroup {
    let gid = match dto.gid {
        Some(gid) if !is_new(Some(&gid)) => gid,
        _ => generate_uid(),
    };
    LessonGroup {
        gid,
        name: dto.name.trim().to_string(),
        grade: dto.grade,
        active: dto.active,
    }
}

/// Replaces the group with the same gid. Returns false when it is not in the list.
pub fn replace_group(groups: &mut [LessonGroup], group: LessonGroup) -> bool {
    match groups.iter_mut().find(|g| g.gid == group.gid) {
        Some(slot) => {
            *slot = group;
            true
        }
        None => false,
    }
}

/// Drops the group with `gid`. Returns false when nothing was removed.
pub fn remove_group(groups: &mut Vec<LessonGroup>, gid: &str) -> bool {
    let before = groups.len();
    groups.retain(|g| g.gid != gid);
    groups.len() != before
}

pub fn group_name(groups: &[LessonGroup], gid: &str) -> Option<String> {
    groups.iter().find(|g| g.gid == gid).map(|g| g.name.clone())
}

/// Slices the stored list to `page`.
pub fn paginate(groups: Vec<LessonGroup>, page: PageRequest) -> PaginatedLessonGroupsResponse {
    let total = groups.len() as i64;
    let meta = page.meta(total);
    let data = groups
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit().min(total) as usize)
        .collect();
    PaginatedLessonGroupsResponse { data, meta }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(gid: &str, name: &str) -> LessonGroup {
        LessonGroup {
            gid: gid.to_string(),
            name: name.to_string(),
            grade: "10".to_string(),
            active: true,
        }
    }

    fn dto(gid: Option<&str>, name: &str) -> LessonGroupDto {
        LessonGroupDto {
            gid: gid.map(str::to_string),
            name: name.to_string(),
            grade: String::new(),
            active: true,
        }
    }

    #[test]
    fn test_new_groups_get_fresh_gid() {
        let created = group_from_dto(dto(Some("-1"), " Robotics "));
        assert_ne!(created.gid, "-1");
        assert_eq!(created.name, "Robotics");

        let created = group_from_dto(dto(None, "Chess"));
        assert!(!created.gid.is_empty());
    }

    #[test]
    fn test_existing_gid_is_kept() {
        assert_eq!(group_from_dto(dto(Some("abc"), "Chess")).gid, "abc");
    }

    #[test]
    fn test_replace_group() {
        let mut groups = vec![group("a", "Chess"), group("b", "Robotics")];
        assert!(replace_group(&mut groups, group("b", "Drones")));
        assert_eq!(groups[1].name, "Drones");
        assert!(!replace_group(&mut groups, group("zz", "Nope")));
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_remove_group() {
        let mut groups = vec![group("a", "Chess"), group("b", "Robotics")];
        assert!(remove_group(&mut groups, "a"));
        assert!(!remove_group(&mut groups, "a"));
        assert_eq!(groups, vec![group("b", "Robotics")]);
    }

    #[test]
    fn test_group_name() {
        let groups = vec![group("a", "Chess")];
        assert_eq!(group_name(&groups, "a").as_deref(), Some("Chess"));
        assert_eq!(group_name(&groups, "b"), None);
    }

    #[test]
    fn test_paginate() {
        let groups: Vec<_> = (0..7).map(|i| group(&i.to_string(), "G")).collect();

        let page = paginate(groups.clone(), PageRequest::new(2, 5));
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].gid, "5");
        assert_eq!(page.meta.total, 7);
        assert!(!page.meta.has_more);

        let all = paginate(groups, PageRequest::all());
        assert_eq!(all.data.len(), 7);
    }

    #[test]
    fn test_paginate_past_end() {
        let page = paginate(vec![group("a", "G")], PageRequest::new(3, 5));
        assert!(page.data.is_empty());
    }
}

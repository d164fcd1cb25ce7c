use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub course: String,
    pub grade: f64,
    pub is_present: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Present,
    Absent,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("all") {
            Some(Self::All)
        } else if s.eq_ignore_ascii_case("present") {
            Some(Self::Present)
        } else if s.eq_ignore_ascii_case("absent") {
            Some(Self::Absent)
        } else {
            None
        }
    }
}

/// Course labels are free-form, so the all-courses case needs its own
/// variant rather than a sentinel string a course could collide with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CourseFilter {
    #[default]
    All,
    Course(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    GradeDesc,
    GradeAsc,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("nameAsc") {
            Some(Self::NameAsc)
        } else if s.eq_ignore_ascii_case("nameDesc") {
            Some(Self::NameDesc)
        } else if s.eq_ignore_ascii_case("gradeDesc") {
            Some(Self::GradeDesc)
        } else if s.eq_ignore_ascii_case("gradeAsc") {
            Some(Self::GradeAsc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewControls {
    pub search_query: String,
    pub status_filter: StatusFilter,
    pub course_filter: CourseFilter,
    pub sort_key: SortKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub average_grade: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub visible: Vec<StudentRecord>,
    /// `visible.len()`, carried separately so a zero-match view is
    /// distinguishable from an empty roster (`stats.total == 0`).
    pub matched: usize,
    pub stats: RosterStats,
}

/// Half-up rounding to one decimal place.
pub fn round_to_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

fn name_cmp(a: &StudentRecord, b: &StudentRecord) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

fn grade_cmp(a: &StudentRecord, b: &StudentRecord) -> Ordering {
    // Grades are validated finite before they reach the store.
    a.grade.partial_cmp(&b.grade).unwrap_or(Ordering::Equal)
}

/// Pure derivation of the display view: filter, stable sort, aggregate.
/// Stats always cover the full record set, not the filtered subset.
pub fn derive_view(records: &[StudentRecord], controls: &ViewControls) -> RosterView {
    let query = controls.search_query.to_lowercase();

    let mut visible: Vec<StudentRecord> = records
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&query))
        .filter(|s| match controls.status_filter {
            StatusFilter::All => true,
            StatusFilter::Present => s.is_present,
            StatusFilter::Absent => !s.is_present,
        })
        .filter(|s| match &controls.course_filter {
            CourseFilter::All => true,
            CourseFilter::Course(course) => s.course == *course,
        })
        .cloned()
        .collect();

    // Vec::sort_by is stable: equal keys keep their input order.
    visible.sort_by(|a, b| match controls.sort_key {
        SortKey::NameAsc => name_cmp(a, b),
        SortKey::NameDesc => name_cmp(b, a),
        SortKey::GradeDesc => grade_cmp(b, a),
        SortKey::GradeAsc => grade_cmp(a, b),
    });

    let total = records.len();
    let present = records.iter().filter(|s| s.is_present).count();
    let average_grade = if total > 0 {
        let sum: f64 = records.iter().map(|s| s.grade).sum();
        round_to_1_decimal(sum / total as f64)
    } else {
        0.0
    };

    let matched = visible.len();
    RosterView {
        visible,
        matched,
        stats: RosterStats {
            total,
            present,
            absent: total - present,
            average_grade,
        },
    }
}

/// Distinct course labels across the whole record set, sorted. Feeds the
/// course-filter selector, so it ignores the active filters.
pub fn course_options(records: &[StudentRecord]) -> Vec<String> {
    records
        .iter()
        .map(|s| s.course.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, course: &str, grade: f64, is_present: bool) -> StudentRecord {
        StudentRecord {
            id: format!("id-{}", name),
            name: name.to_string(),
            course: course.to_string(),
            grade,
            is_present,
            created_at: String::new(),
        }
    }

    fn controls() -> ViewControls {
        ViewControls::default()
    }

    #[test]
    fn round_to_1_decimal_is_half_up() {
        assert_eq!(round_to_1_decimal(0.0), 0.0);
        assert_eq!(round_to_1_decimal(3.54), 3.5);
        assert_eq!(round_to_1_decimal(3.55), 3.6);
        assert_eq!(round_to_1_decimal(79.96), 80.0);
    }

    #[test]
    fn absent_filter_with_full_set_stats() {
        let records = vec![rec("Alice", "CS", 90.0, true), rec("Bob", "Math", 70.0, false)];
        let view = derive_view(
            &records,
            &ViewControls {
                status_filter: StatusFilter::Absent,
                ..controls()
            },
        );

        assert_eq!(view.matched, 1);
        assert_eq!(view.visible[0].name, "Bob");
        assert_eq!(view.stats.total, 2);
        assert_eq!(view.stats.present, 1);
        assert_eq!(view.stats.absent, 1);
        assert_eq!(view.stats.average_grade, 80.0);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let records = vec![
            rec("Alice Carter", "CS", 90.0, true),
            rec("Bob", "Math", 70.0, true),
            rec("Carla", "CS", 85.0, true),
        ];
        let view = derive_view(
            &records,
            &ViewControls {
                search_query: "car".to_string(),
                ..controls()
            },
        );
        let names: Vec<&str> = view.visible.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alice Carter", "Carla"]);
    }

    #[test]
    fn empty_search_matches_everything() {
        let records = vec![rec("Alice", "CS", 90.0, true), rec("Bob", "Math", 70.0, false)];
        let view = derive_view(&records, &controls());
        assert_eq!(view.matched, 2);
    }

    #[test]
    fn course_filter_is_exact_and_case_sensitive() {
        let records = vec![
            rec("Alice", "CS", 90.0, true),
            rec("Bob", "cs", 70.0, true),
            rec("Carla", "Math", 85.0, true),
        ];
        let view = derive_view(
            &records,
            &ViewControls {
                course_filter: CourseFilter::Course("CS".to_string()),
                ..controls()
            },
        );
        assert_eq!(view.matched, 1);
        assert_eq!(view.visible[0].name, "Alice");
    }

    #[test]
    fn filters_compose() {
        let records = vec![
            rec("Ann", "CS", 90.0, true),
            rec("Anna", "CS", 80.0, false),
            rec("Annabel", "Math", 70.0, false),
        ];
        let view = derive_view(
            &records,
            &ViewControls {
                search_query: "ann".to_string(),
                status_filter: StatusFilter::Absent,
                course_filter: CourseFilter::Course("CS".to_string()),
                sort_key: SortKey::NameAsc,
            },
        );
        assert_eq!(view.matched, 1);
        assert_eq!(view.visible[0].name, "Anna");
    }

    #[test]
    fn name_sort_ignores_case() {
        let records = vec![
            rec("bob", "CS", 70.0, true),
            rec("Alice", "CS", 90.0, true),
            rec("Carla", "CS", 85.0, true),
        ];
        let asc = derive_view(
            &records,
            &ViewControls {
                sort_key: SortKey::NameAsc,
                ..controls()
            },
        );
        let names: Vec<&str> = asc.visible.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "bob", "Carla"]);

        let desc = derive_view(
            &records,
            &ViewControls {
                sort_key: SortKey::NameDesc,
                ..controls()
            },
        );
        let names: Vec<&str> = desc.visible.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Carla", "bob", "Alice"]);
    }

    #[test]
    fn grade_sort_keeps_input_order_on_ties() {
        let records = vec![
            rec("First", "CS", 85.0, true),
            rec("Second", "CS", 85.0, true),
            rec("Third", "CS", 92.0, true),
        ];
        let view = derive_view(
            &records,
            &ViewControls {
                sort_key: SortKey::GradeDesc,
                ..controls()
            },
        );
        let names: Vec<&str> = view.visible.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "First", "Second"]);

        let view = derive_view(
            &records,
            &ViewControls {
                sort_key: SortKey::GradeAsc,
                ..controls()
            },
        );
        let names: Vec<&str> = view.visible.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn empty_roster_yields_zero_stats() {
        let view = derive_view(&[], &controls());
        assert!(view.visible.is_empty());
        assert_eq!(view.matched, 0);
        assert_eq!(
            view.stats,
            RosterStats {
                total: 0,
                present: 0,
                absent: 0,
                average_grade: 0.0,
            }
        );
    }

    #[test]
    fn stats_are_unaffected_by_controls() {
        let records = vec![
            rec("Alice", "CS", 90.0, true),
            rec("Bob", "Math", 70.0, false),
            rec("Carla", "CS", 80.0, true),
        ];
        let unfiltered = derive_view(&records, &controls());
        let filtered = derive_view(
            &records,
            &ViewControls {
                search_query: "no such student".to_string(),
                status_filter: StatusFilter::Absent,
                course_filter: CourseFilter::Course("CS".to_string()),
                sort_key: SortKey::GradeAsc,
            },
        );
        assert_eq!(filtered.matched, 0);
        assert_eq!(filtered.stats, unfiltered.stats);
        assert_eq!(filtered.stats.total, 3);
    }

    #[test]
    fn derive_view_is_deterministic() {
        let records = vec![
            rec("Alice", "CS", 90.0, true),
            rec("Bob", "Math", 70.0, false),
        ];
        let c = ViewControls {
            search_query: "a".to_string(),
            status_filter: StatusFilter::All,
            course_filter: CourseFilter::All,
            sort_key: SortKey::GradeDesc,
        };
        assert_eq!(derive_view(&records, &c), derive_view(&records, &c));
    }

    #[test]
    fn visible_is_filtered_subsequence_of_input() {
        let records = vec![
            rec("Ava", "CS", 91.0, true),
            rec("Ben", "Math", 62.0, false),
            rec("Avery", "CS", 77.0, true),
            rec("Abe", "CS", 88.0, false),
        ];
        let c = ViewControls {
            search_query: "a".to_string(),
            status_filter: StatusFilter::Present,
            course_filter: CourseFilter::Course("CS".to_string()),
            ..controls()
        };
        let view = derive_view(&records, &c);

        for s in &view.visible {
            assert!(s.name.to_lowercase().contains("a"));
            assert!(s.is_present);
            assert_eq!(s.course, "CS");
        }
        let expected: Vec<&StudentRecord> = records
            .iter()
            .filter(|s| s.name.to_lowercase().contains("a") && s.is_present && s.course == "CS")
            .collect();
        assert_eq!(view.visible.len(), expected.len());
    }

    #[test]
    fn course_options_distinct_sorted_unfiltered() {
        let records = vec![
            rec("Alice", "Math", 90.0, true),
            rec("Bob", "CS", 70.0, false),
            rec("Carla", "Math", 80.0, true),
            rec("Dan", "Art", 65.0, true),
        ];
        assert_eq!(course_options(&records), vec!["Art", "CS", "Math"]);
        assert!(course_options(&[]).is_empty());
    }
}

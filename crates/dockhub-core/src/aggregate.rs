//! Category grouping and display ordering.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::ServiceView;

/// All views of one category, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub services: Vec<ServiceView>,
}

/// Main-partition views grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregated {
    /// Groups in the order their category was first seen.
    pub groups: Vec<CategoryGroup>,
    /// Every present category exactly once, persisted order first.
    pub display_order: Vec<String>,
}

impl Aggregated {
    pub fn group(&self, category: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.category == category)
    }

    /// Groups in display order.
    pub fn ordered(&self) -> impl Iterator<Item = &CategoryGroup> {
        self.display_order.iter().filter_map(|c| self.group(c))
    }
}

/// Stable group-by on category.
pub fn group_by_category(views: Vec<ServiceView>) -> Vec<CategoryGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for view in views {
        match index.get(&view.category) {
            Some(&i) => groups[i].services.push(view),
            None => {
                index.insert(view.category.clone(), groups.len());
                groups.push(CategoryGroup {
                    category: view.category.clone(),
                    services: vec![view],
                });
            }
        }
    }
    groups
}

/// Persisted entries that are present keep their relative order; stale
/// entries are dropped; unlisted present categories follow in `present`
/// order. Duplicates in `persisted` are collapsed.
pub fn display_order(persisted: &[String], present: &[&str]) -> Vec<String> {
    let mut order: Vec<String> = Vec::with_capacity(present.len());
    for name in persisted {
        if present.contains(&name.as_str()) && !order.contains(name) {
            order.push(name.clone());
        }
    }
    for name in present {
        if !order.iter().any(|o| o == name) {
            order.push((*name).to_string());
        }
    }
    order
}

pub fn aggregate(main_views: Vec<ServiceView>, persisted_order: &[String]) -> Aggregated {
    let groups = group_by_category(main_views);
    let present: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
    let display_order = display_order(persisted_order, &present);
    Aggregated {
        groups,
        display_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(name: &str, category: &str) -> ServiceView {
        ServiceView {
            name: name.into(),
            container_name: name.into(),
            description: String::new(),
            icon: String::new(),
            category: category.into(),
            uncategorized: false,
            url: "//h:1".into(),
            host_port: "1".into(),
            container_port: "1".into(),
            status: "Up".into(),
            created: "now".into(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn stale_entries_dropped_new_appended() {
        let agg = aggregate(
            vec![view("a", "Other"), view("b", "Dev")],
            &names(&["Media", "Other", "Ghost"]),
        );
        assert_eq!(agg.display_order, names(&["Other", "Dev"]));
    }

    #[test]
    fn persisted_order_wins_over_arrival() {
        let agg = aggregate(
            vec![view("a", "Dev"), view("b", "Media"), view("c", "Tools")],
            &names(&["Tools", "Dev"]),
        );
        assert_eq!(agg.display_order, names(&["Tools", "Dev", "Media"]));
    }

    #[test]
    fn grouping_is_stable() {
        let agg = aggregate(
            vec![
                view("a", "Dev"),
                view("b", "Media"),
                view("c", "Dev"),
                view("d", "Media"),
            ],
            &[],
        );
        let dev: Vec<_> = agg.group("Dev").unwrap().services.iter().map(|v| &*v.name).collect();
        assert_eq!(dev, vec!["a", "c"]);
        assert_eq!(agg.display_order, names(&["Dev", "Media"]));
    }

    #[test]
    fn order_is_exact_permutation_of_present() {
        let agg = aggregate(
            vec![view("a", "X"), view("b", "Y"), view("c", "Z")],
            &names(&["Y", "Y", "Q", "X", "Y"]),
        );
        assert_eq!(agg.display_order, names(&["Y", "X", "Z"]));
        let ordered: Vec<_> = agg.ordered().map(|g| &*g.category).collect();
        assert_eq!(ordered, vec!["Y", "X", "Z"]);
    }

    #[test]
    fn empty_main_has_empty_order() {
        let agg = aggregate(Vec::new(), &names(&["Media"]));
        assert!(agg.groups.is_empty());
        assert!(agg.display_order.is_empty());
    }
}

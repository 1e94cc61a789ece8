use git2::Oid;

/// Whether a fetched ref is a branch head or a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Branch,
    Tag,
}

/// Local view of one advertised ref, taken around a fetch.
///
/// - `old`: tracking ref target before the fetch (`None` if it did not exist)
/// - `tracking`: tracking ref target after the fetch (`None` if still missing)
/// - `advertised`: what the remote announced for this ref
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipUpdate {
    pub old: Option<Oid>,
    pub tracking: Option<Oid>,
    pub advertised: Oid,
}

/// Decoded per-ref fetch status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchFlags {
    pub head_up_to_date: bool,
    pub fast_forward: bool,
    pub error: bool,
    pub forced_update: bool,
    pub rejected: bool,
    pub new_tag: bool,
    pub new_head: bool,
}

impl FetchFlags {
    /// Decode the status of a ref from its tips.
    ///
    /// `descends_from_old` tells whether the new tracking tip has the old one
    /// in its history; it only matters when the tip actually moved.
    pub fn decode(kind: RefKind, tip: &TipUpdate, descends_from_old: bool) -> Self {
        let created = tip.old.is_none() && tip.tracking.is_some();
        let moved = matches!((tip.old, tip.tracking), (Some(o), Some(t)) if o != t);

        Self {
            head_up_to_date: tip.old.is_some() && tip.old == tip.tracking,
            fast_forward: moved && descends_from_old,
            error: tip.tracking.is_none(),
            forced_update: moved && !descends_from_old,
            rejected: tip.tracking.is_some_and(|t| t != tip.advertised),
            new_tag: created && kind == RefKind::Tag,
            new_head: created && kind == RefKind::Branch,
        }
    }

    /// Flags as `(name, value)` pairs, in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> {
        [
            ("HEAD_UPTODATE", self.head_up_to_date),
            ("FAST_FORWARD", self.fast_forward),
            ("ERROR", self.error),
            ("FORCED_UPDATE", self.forced_update),
            ("REJECTED", self.rejected),
            ("NEW_TAG", self.new_tag),
            ("NEW_HEAD", self.new_head),
        ]
        .into_iter()
    }

    /// Names of the flags that are set.
    pub fn set_names(&self) -> Vec<&'static str> {
        self.iter().filter(|(_, on)| *on).map(|(n, _)| n).collect()
    }
}

/// Outcome of fetching a single remote ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRecord {
    /// Short name: `main`, `feature/x`, `v1.0`.
    pub name: String,
    pub kind: RefKind,
    /// Local ref that receives the remote tip, e.g. `refs/remotes/origin/main`.
    pub remote_ref_path: String,
    /// Tip announced by the remote.
    pub commit: Oid,
    pub old_commit: Option<Oid>,
    pub flags: FetchFlags,
}

/// All refs touched by one fetch, ordered by ref name.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    records: Vec<FetchRecord>,
}

impl FetchReport {
    pub fn new(mut records: Vec<FetchRecord>) -> Self {
        records.sort_by(|a, b| (a.kind as u8, &a.name).cmp(&(b.kind as u8, &b.name)));
        Self { records }
    }

    pub fn records(&self) -> &[FetchRecord] {
        &self.records
    }

    pub fn branch(&self, name: &str) -> Option<&FetchRecord> {
        self.records
            .iter()
            .find(|r| r.kind == RefKind::Branch && r.name == name)
    }

    pub fn branch_names(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.kind == RefKind::Branch)
            .map(|r| r.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(n: u8) -> Oid {
        Oid::from_bytes(&[n; 20]).unwrap()
    }

    fn record(name: &str, kind: RefKind) -> FetchRecord {
        FetchRecord {
            name: name.to_string(),
            kind,
            remote_ref_path: format!("refs/remotes/origin/{}", name),
            commit: oid(1),
            old_commit: None,
            flags: FetchFlags::default(),
        }
    }

    #[test]
    fn unchanged_tip_is_up_to_date_only() {
        let tip = TipUpdate {
            old: Some(oid(1)),
            tracking: Some(oid(1)),
            advertised: oid(1),
        };
        let f = FetchFlags::decode(RefKind::Branch, &tip, false);
        assert_eq!(f.set_names(), vec!["HEAD_UPTODATE"]);
    }

    #[test]
    fn moved_to_descendant_is_fast_forward() {
        let tip = TipUpdate {
            old: Some(oid(1)),
            tracking: Some(oid(2)),
            advertised: oid(2),
        };
        let f = FetchFlags::decode(RefKind::Branch, &tip, true);
        assert!(f.fast_forward);
        assert!(!f.forced_update);
        assert!(!f.head_up_to_date);
    }

    #[test]
    fn moved_to_unrelated_tip_is_forced() {
        let tip = TipUpdate {
            old: Some(oid(1)),
            tracking: Some(oid(3)),
            advertised: oid(3),
        };
        let f = FetchFlags::decode(RefKind::Branch, &tip, false);
        assert!(f.forced_update);
        assert!(!f.fast_forward);
    }

    #[test]
    fn new_refs_are_classified_by_kind() {
        let tip = TipUpdate {
            old: None,
            tracking: Some(oid(4)),
            advertised: oid(4),
        };
        assert!(FetchFlags::decode(RefKind::Branch, &tip, false).new_head);
        let tag = FetchFlags::decode(RefKind::Tag, &tip, false);
        assert!(tag.new_tag);
        assert!(!tag.new_head);
    }

    #[test]
    fn tracking_ref_not_matching_remote_is_rejected() {
        let tip = TipUpdate {
            old: Some(oid(1)),
            tracking: Some(oid(1)),
            advertised: oid(2),
        };
        let f = FetchFlags::decode(RefKind::Branch, &tip, false);
        assert!(f.rejected);
        assert!(!f.error);
    }

    #[test]
    fn missing_tracking_ref_is_error() {
        let tip = TipUpdate {
            old: None,
            tracking: None,
            advertised: oid(2),
        };
        let f = FetchFlags::decode(RefKind::Branch, &tip, false);
        assert_eq!(f.set_names(), vec!["ERROR"]);
    }

    #[test]
    fn report_orders_branches_before_tags_by_name() {
        let report = FetchReport::new(vec![
            record("v1", RefKind::Tag),
            record("main", RefKind::Branch),
            record("dev", RefKind::Branch),
        ]);
        let names: Vec<_> = report.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["dev", "main", "v1"]);
        assert_eq!(report.branch_names(), vec!["dev", "main"]);
        assert!(report.branch("v1").is_none());
        assert_eq!(report.branch("main").unwrap().name, "main");
    }
}

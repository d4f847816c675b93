//! Reachability walk
//!
//! Depth-first pre-order over reference features (merged feature order) and
//! FS-array elements (element order), starting from each root in turn. The
//! walk uses an explicit stack, so deep lists cannot overflow the call
//! stack, and visits every feature structure exactly once. For the same
//! graph shape the output order is always the same.

use std::collections::HashSet;

use super::errors::StoreResult;
use super::heap::Store;
use super::value::FsId;

impl Store {
    /// Every feature structure reachable from `roots`, roots included, each
    /// exactly once, in walk order.
    pub fn reachable_from(&self, roots: &[FsId]) -> StoreResult<Vec<FsId>> {
        let mut visited: HashSet<FsId> = HashSet::new();
        let mut out = Vec::new();
        let mut stack: Vec<FsId> = roots.iter().rev().copied().collect();
        let mut children = Vec::new();

        while let Some(fs) = stack.pop() {
            if !visited.insert(fs) {
                continue;
            }
            out.push(fs);

            children.clear();
            self.collect_refs(fs, &mut children)?;
            // Reverse so the first child is popped next
            stack.extend(children.iter().rev().filter(|c| !visited.contains(*c)));
        }
        Ok(out)
    }

    /// Outgoing references of `fs`, in slot order then element order.
    pub fn collect_refs(&self, fs: FsId, out: &mut Vec<FsId>) -> StoreResult<()> {
        let ts = self.type_system().clone();
        let t = self.type_of(fs)?;
        for f in ts.features_of(t) {
            if ts.is_reference_feature(*f) {
                if let Some(target) = self.get(fs, *f)?.as_ref_id() {
                    out.push(target);
                }
            }
        }
        if let Ok(data) = self.array_data(fs) {
            out.extend(data.refs());
        }
        Ok(())
    }
}

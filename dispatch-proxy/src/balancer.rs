//! The interface balancer (spec §3, §4.3): catalogues configured outgoing
//! source addresses, partitioned by address family, and answers "give me
//! the best source for family F" under a weighted least-connections policy.

use crate::address::{Family, HostAddress};

/// A configured outgoing source address.
#[derive(Debug, Clone)]
pub struct Interface {
    pub addr: HostAddress,
    pub family: Family,
    pub metric: u32,
    in_use: u32,
}

impl Interface {
    pub fn in_use(&self) -> u32 {
        self.in_use
    }
}

/// An opaque borrow on an acquired interface, used by a session to release
/// it exactly once. Carries the family bucket and index rather than a raw
/// reference, per Design Notes §9 ("sessions hold an opaque borrow (index
/// or reference) — never own or mutate the list").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceHandle {
    family: Family,
    index: usize,
}

/// Holds interfaces partitioned by family. `in_use` on every interface is
/// always >= 0 and equals the number of live sessions holding it.
#[derive(Debug, Default)]
pub struct InterfaceManager {
    inet: Vec<Interface>,
    inet6: Vec<Interface>,
}

impl InterfaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new interface to the bucket for its family.
    pub fn add(&mut self, addr: HostAddress, metric: u32) {
        let family = addr.family();
        let bucket = self.bucket_mut(family);
        bucket.push(Interface {
            addr,
            family,
            metric,
            in_use: 0,
        });
    }

    fn bucket(&self, family: Family) -> &Vec<Interface> {
        match family {
            Family::Inet => &self.inet,
            Family::Inet6 => &self.inet6,
        }
    }

    fn bucket_mut(&mut self, family: Family) -> &mut Vec<Interface> {
        match family {
            Family::Inet => &mut self.inet,
            Family::Inet6 => &mut self.inet6,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inet.is_empty() && self.inet6.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inet.len() + self.inet6.len()
    }

    /// Select the best interface among those whose family bit is set in
    /// `family_mask` (bit 0 = INET, bit 1 = INET6): the one minimizing the
    /// load ratio `in_use / metric`, compared by cross-multiplication to
    /// avoid floats, ties broken by first-inserted. On success, atomically
    /// increments `in_use` and returns a borrow; `None` if no interface
    /// matches the mask.
    pub fn acquire(&mut self, family_mask: u8) -> Option<InterfaceHandle> {
        let mut best: Option<(Family, usize)> = None;

        for family in [Family::Inet, Family::Inet6] {
            if family_mask & family.bit() == 0 {
                continue;
            }
            for (idx, iface) in self.bucket(family).iter().enumerate() {
                best = Some(match best {
                    None => (family, idx),
                    Some((bf, bidx)) => {
                        let current = &self.bucket(bf)[bidx];
                        if load_ratio_less(iface, current) {
                            (family, idx)
                        } else {
                            (bf, bidx)
                        }
                    }
                });
            }
        }

        let (family, index) = best?;
        self.bucket_mut(family)[index].in_use += 1;
        Some(InterfaceHandle { family, index })
    }

    /// Release a previously acquired interface. Must be called exactly once
    /// per successful `acquire`.
    pub fn release(&mut self, handle: InterfaceHandle) {
        let iface = &mut self.bucket_mut(handle.family)[handle.index];
        debug_assert!(iface.in_use > 0, "release without matching acquire");
        iface.in_use = iface.in_use.saturating_sub(1);
    }

    pub fn get(&self, handle: InterfaceHandle) -> &Interface {
        &self.bucket(handle.family)[handle.index]
    }

    /// Total `in_use` across every interface (testable property 3/4).
    pub fn total_in_use(&self) -> u64 {
        self.inet
            .iter()
            .chain(self.inet6.iter())
            .map(|i| i.in_use() as u64)
            .sum()
    }
}

/// `candidate` has a strictly lower load ratio than `current`:
/// `candidate.in_use / candidate.metric < current.in_use / current.metric`,
/// via cross-multiplication (both metrics are positive by construction).
fn load_ratio_less(candidate: &Interface, current: &Interface) -> bool {
    (candidate.in_use as u64) * (current.metric as u64)
        < (current.in_use as u64) * (candidate.metric as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(o: [u8; 4]) -> HostAddress {
        HostAddress::V4(o)
    }

    #[test]
    fn acquire_none_when_no_family_match() {
        let mut mgr = InterfaceManager::new();
        mgr.add(v4([127, 0, 0, 1]), 1);
        assert!(mgr.acquire(Family::Inet6.bit()).is_none());
    }

    #[test]
    fn acquire_release_roundtrip() {
        let mut mgr = InterfaceManager::new();
        mgr.add(v4([127, 0, 0, 1]), 1);
        let h = mgr.acquire(Family::Inet.bit()).unwrap();
        assert_eq!(mgr.get(h).in_use(), 1);
        mgr.release(h);
        assert_eq!(mgr.get(h).in_use(), 0);
    }

    #[test]
    fn equal_metrics_spread_evenly() {
        let mut mgr = InterfaceManager::new();
        mgr.add(v4([10, 0, 0, 1]), 1);
        mgr.add(v4([10, 0, 0, 2]), 1);

        let mut held = Vec::new();
        for _ in 0..10 {
            held.push(mgr.acquire(Family::Inet.bit()).unwrap());
        }
        let counts: Vec<u32> = (0..2)
            .map(|i| {
                mgr.get(InterfaceHandle {
                    family: Family::Inet,
                    index: i,
                })
                .in_use()
            })
            .collect();
        assert_eq!(counts, vec![5, 5]);

        for h in held {
            mgr.release(h);
        }
        assert_eq!(mgr.total_in_use(), 0);
    }

    #[test]
    fn weighted_metrics_spread_proportionally() {
        let mut mgr = InterfaceManager::new();
        mgr.add(v4([10, 0, 0, 1]), 1);
        mgr.add(v4([10, 0, 0, 2]), 3);

        let mut held = Vec::new();
        for _ in 0..8 {
            held.push(mgr.acquire(Family::Inet.bit()).unwrap());
        }
        let counts: Vec<u32> = (0..2)
            .map(|i| {
                mgr.get(InterfaceHandle {
                    family: Family::Inet,
                    index: i,
                })
                .in_use()
            })
            .collect();
        assert_eq!(counts, vec![2, 6]);
    }

    #[test]
    fn ties_broken_by_first_inserted() {
        let mut mgr = InterfaceManager::new();
        mgr.add(v4([10, 0, 0, 1]), 1);
        mgr.add(v4([10, 0, 0, 2]), 1);
        let h = mgr.acquire(Family::Inet.bit()).unwrap();
        assert_eq!(
            h,
            InterfaceHandle {
                family: Family::Inet,
                index: 0
            }
        );
    }
}

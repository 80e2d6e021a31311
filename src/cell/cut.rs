//! The plane-cut: classify, trace the cut contour, rewire, excise, collapse.
//!
//! The cut works in five phases over the half-edge table:
//!
//! 1. every vertex gets one verdict from the tolerant classifier; an
//!    on-plane vertex with no inside neighbour is demoted to outside;
//! 2. the cut contour is traced by repeated face-walks from a crossing
//!    edge, appending one interpolated vertex per crossed edge and reusing
//!    kept on-plane vertices in place;
//! 3. new vertices are wired as `[kept endpoint, previous, next]` around the
//!    contour, reused vertices have their cyclic lists rebuilt with each
//!    out-arc replaced by the matching passage's contour links;
//! 4. back-indices are recomputed over the touched set, then every outside
//!    vertex is deleted by swap-with-last via the `ds` stack;
//! 5. order-1 and order-2 vertices are collapsed to a fixed point via `ds2`.
//!
//! Surviving vertex indices are permuted by step 4; callers must not keep
//! indices across a cut.

use super::{NeighborMode, VoronoiCellBase, SCRATCH_CLEAR};
use crate::cell::classify::Verdict;
use crate::error::VoroError;
use crate::real::Real;

/// One stop of the cut contour.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContourEntry {
    /// The contour vertex: freshly interpolated, or a reused on-plane one.
    pub cv: u32,
    /// Kept endpoint of the crossing edge (equals `cv` when reused).
    pub l: u32,
    /// Position of the outside endpoint in `l`'s neighbour list.
    pub bl: u32,
    pub reused: bool,
    /// For reused entries: position of the outside endpoint in `cv`'s list,
    /// identifying which out-arc this passage consumes.
    pub entry_pos: u32,
    /// Tag of the face the trace crosses after this entry.
    pub inherit: i32,
}

impl<M: NeighborMode> VoronoiCellBase<M> {
    #[inline]
    pub(crate) fn tag(&self, v: usize, m: usize) -> i32 {
        if M::TRACKS {
            self.neigh_store().get(self.order(v), self.record_slot(v), m)
        } else {
            0
        }
    }

    #[inline]
    pub(crate) fn set_tag(&mut self, v: usize, m: usize, id: i32) {
        if M::TRACKS {
            let k = self.order(v);
            let slot = self.record_slot(v);
            self.neigh_mut().set(k, slot, m, id);
        }
    }

    /// Mark `v` as touched by the current cut (scratch slot doubles as the
    /// membership flag) so the back-index fixup visits it once.
    fn touch(&mut self, v: usize) {
        if self.scratch_of(v) == SCRATCH_CLEAR {
            self.set_scratch_of(v, 0);
            self.touched.push(v as u32);
        }
    }

    /// Cut by the half-space of a seed `p_id`; see
    /// [`plane`](VoronoiCellBase::plane) for the geometry and the return
    /// contract.
    pub(crate) fn plane_id(
        &mut self,
        x: Real,
        y: Real,
        z: Real,
        rsq: Real,
        p_id: i32,
    ) -> Result<bool, VoroError> {
        let p0 = self.p;
        self.tester.init(x, y, z, rsq);

        // phase 1: classify
        self.verdicts.clear();
        let mut outs = 0usize;
        let mut ins = 0usize;
        for v in 0..p0 {
            let (vx, vy, vz) = self.pt(v);
            let (verdict, _) = self.tester.test(v as u32, vx, vy, vz);
            match verdict {
                Verdict::Out => outs += 1,
                Verdict::In => ins += 1,
                Verdict::On => {}
            }
            self.verdicts.push(verdict);
        }
        if outs == 0 {
            return Ok(true);
        }
        if ins == 0 {
            return Ok(false);
        }
        // demote on-plane vertices with no inside neighbour
        for v in 0..p0 {
            if self.verdicts[v] != Verdict::On {
                continue;
            }
            let mut has_in = false;
            for m in 0..self.order(v) {
                if self.verdicts[self.nbr(v, m) as usize] == Verdict::In {
                    has_in = true;
                    break;
                }
            }
            if !has_in {
                self.verdicts[v] = Verdict::Out;
            }
        }

        // phase 2: find a crossing edge and trace the contour
        let mut start = None;
        'search: for u in 0..p0 {
            if self.verdicts[u] != Verdict::Out {
                continue;
            }
            for m in 0..self.order(u) {
                if self.verdicts[self.nbr(u, m) as usize] != Verdict::Out {
                    start = Some((u, m));
                    break 'search;
                }
            }
        }
        let Some((start_u, start_m)) = start else {
            // outside vertices exist but none borders a kept one
            return Err(VoroError::BrokenTopology { vertex: 0 });
        };

        self.contour.clear();
        let guard_limit = 12 * p0 + 256;
        let mut guard = 0usize;
        let (mut u, mut m) = (start_u, start_m);
        loop {
            let l = self.nbr(u, m) as usize;
            let bl = self.back(u, m) as u32;
            let inherit = self.tag(u, m);
            if self.verdicts[l] == Verdict::On {
                self.contour.push(ContourEntry {
                    cv: l as u32,
                    l: l as u32,
                    bl,
                    reused: true,
                    entry_pos: bl,
                    inherit,
                });
            } else {
                let (ux, uy, uz) = self.pt(u);
                let (lx, ly, lz) = self.pt(l);
                let du = self.tester.dist(ux, uy, uz);
                let dl = self.tester.dist(lx, ly, lz);
                let t = dl / (dl - du);
                let cv = self.add_vertex(
                    lx + (ux - lx) * t,
                    ly + (uy - ly) * t,
                    lz + (uz - lz) * t,
                )?;
                self.verdicts.push(Verdict::In);
                self.contour.push(ContourEntry {
                    cv,
                    l: l as u32,
                    bl,
                    reused: false,
                    entry_pos: 0,
                    inherit,
                });
            }
            // walk the face containing the directed edge (u -> l) until it
            // crosses back out of the kept region
            let (mut i, mut jm) = (u, m);
            loop {
                let j = self.nbr(i, jm) as usize;
                let bb = self.back(i, jm);
                i = j;
                jm = (bb + 1) % self.order(j);
                let nxt = self.nbr(i, jm) as usize;
                if self.verdicts[nxt] == Verdict::Out {
                    let nb = self.back(i, jm);
                    u = nxt;
                    m = nb;
                    break;
                }
                guard += 1;
                if guard > guard_limit {
                    return Err(VoroError::BrokenTopology { vertex: i });
                }
            }
            if (u, m) == (start_u, start_m) {
                break;
            }
            if self.contour.len() > 4 * p0 + 64 {
                return Err(VoroError::BrokenTopology { vertex: u });
            }
        }

        let mut contour = std::mem::take(&mut self.contour);

        // merge consecutive passages through the same reused vertex (a
        // pinched contour from an out-arc of length >= 2); keep the first
        // entry's arc position and the last entry's crossing tag
        if contour.len() > 1 {
            while contour[0].reused && contour[0].cv == contour[contour.len() - 1].cv {
                if contour.iter().all(|e| e.cv == contour[0].cv) {
                    contour.truncate(1);
                    break;
                }
                contour.rotate_left(1);
            }
            let mut merged: Vec<ContourEntry> = Vec::with_capacity(contour.len());
            for e in contour.drain(..) {
                if let Some(last) = merged.last_mut() {
                    if last.reused && e.reused && last.cv == e.cv {
                        last.inherit = e.inherit;
                        continue;
                    }
                }
                merged.push(e);
            }
            contour = merged;
        }
        let nc = contour.len();
        if nc == 1 && !contour[0].reused {
            return Err(VoroError::BrokenTopology {
                vertex: contour[0].cv as usize,
            });
        }

        // phase 3a: wire new vertices
        for t in 0..nc {
            let e = contour[t];
            if e.reused {
                continue;
            }
            let prev = contour[(t + nc - 1) % nc];
            let nxt = contour[(t + 1) % nc].cv;
            let cv = e.cv as usize;
            if prev.cv == nxt {
                let s = self.alloc_record(2, e.cv);
                self.set_order(cv, 2, s);
                self.set_nbr(cv, 0, e.l);
                self.set_nbr(cv, 1, prev.cv);
                self.set_tag(cv, 0, e.inherit);
                self.set_tag(cv, 1, p_id);
            } else {
                let s = self.alloc_record(3, e.cv);
                self.set_order(cv, 3, s);
                self.set_nbr(cv, 0, e.l);
                self.set_nbr(cv, 1, prev.cv);
                self.set_nbr(cv, 2, nxt);
                self.set_tag(cv, 0, e.inherit);
                self.set_tag(cv, 1, prev.inherit);
                self.set_tag(cv, 2, p_id);
            }
            self.set_nbr(e.l as usize, e.bl as usize, e.cv);
            self.touch(cv);
            self.touch(e.l as usize);
        }

        // phase 3b: rebuild reused on-plane vertices
        let mut processed = vec![false; nc];
        for t in 0..nc {
            if !contour[t].reused || processed[t] {
                continue;
            }
            let v = contour[t].cv as usize;
            // all passages of the contour through v, one per out-arc
            let mut passages: Vec<(u32, u32, u32, i32)> = Vec::new();
            for t2 in t..nc {
                if contour[t2].reused && contour[t2].cv == contour[t].cv {
                    processed[t2] = true;
                    let prev = contour[(t2 + nc - 1) % nc];
                    let nxt = contour[(t2 + 1) % nc].cv;
                    passages.push((contour[t2].entry_pos, prev.cv, nxt, prev.inherit));
                }
            }
            let k = self.order(v);
            let mut old_nbr = Vec::with_capacity(k);
            let mut old_tag = Vec::with_capacity(k);
            let mut keep = Vec::with_capacity(k);
            for mm in 0..k {
                let w = self.nbr(v, mm);
                old_nbr.push(w);
                old_tag.push(self.tag(v, mm));
                keep.push(self.verdicts[w as usize] != Verdict::Out);
            }
            // rotate the scan to start on a kept neighbour so arcs never wrap
            let Some(r) = keep.iter().position(|&kp| kp) else {
                return Err(VoroError::BrokenTopology { vertex: v });
            };
            let mut new_nbr: Vec<u32> = Vec::with_capacity(k + 2);
            let mut new_tag: Vec<i32> = Vec::with_capacity(k + 2);
            let mut pos = 0;
            while pos < k {
                let q = (r + pos) % k;
                if keep[q] {
                    new_nbr.push(old_nbr[q]);
                    new_tag.push(old_tag[q]);
                    pos += 1;
                    continue;
                }
                let arc_start = pos;
                while pos < k && !keep[(r + pos) % k] {
                    pos += 1;
                }
                let in_arc = |e: u32| {
                    (arc_start..pos).any(|a| (r + a) % k == e as usize)
                };
                let Some(&(_, prv, nxt, tag_prv)) =
                    passages.iter().find(|&&(ep, ..)| in_arc(ep))
                else {
                    return Err(VoroError::BrokenTopology { vertex: v });
                };
                for (c, tg) in [(prv, tag_prv), (nxt, p_id)] {
                    if c != v as u32 && !new_nbr.contains(&c) && !old_nbr.contains(&c) {
                        new_nbr.push(c);
                        new_tag.push(tg);
                    }
                }
            }
            let k_new = new_nbr.len();
            self.free_record(k, self.record_slot(v));
            let s = self.alloc_record(k_new, v as u32);
            self.set_order(v, k_new, s);
            for (mm, (&w, &tg)) in new_nbr.iter().zip(&new_tag).enumerate() {
                self.set_nbr(v, mm, w);
                self.set_tag(v, mm, tg);
            }
            self.touch(v);
        }

        // phase 4a: recompute back-indices over the touched set
        for idx in 0..self.touched.len() {
            let v = self.touched[idx] as usize;
            for mm in 0..self.order(v) {
                let j = self.nbr(v, mm) as usize;
                let b = self.position_of(j, v as u32)?;
                self.set_back(v, mm, b);
                self.set_back(j, b, mm);
            }
        }
        for idx in 0..self.touched.len() {
            let v = self.touched[idx] as usize;
            self.set_scratch_of(v, SCRATCH_CLEAR);
        }
        self.touched.clear();
        self.contour = contour;
        self.contour.clear();

        // phase 4b: excise the outside vertices
        let mut ds = std::mem::take(&mut self.ds);
        ds.clear();
        for v in 0..p0 {
            if self.verdicts[v] == Verdict::Out {
                ds.push(v as u32);
            }
        }
        for &v in ds.iter().rev() {
            self.delete_vertex(v as usize);
        }
        ds.clear();
        self.ds = ds;

        // phase 5
        self.collapse()?;
        Ok(true)
    }

    /// Collapse order-1 and order-2 vertices until none remain.
    fn collapse(&mut self) -> Result<(), VoroError> {
        let mut ds2 = std::mem::take(&mut self.ds2);
        loop {
            ds2.clear();
            for v in 0..self.p {
                if self.order(v) < 3 {
                    ds2.push(v as u32);
                }
            }
            if ds2.is_empty() {
                break;
            }
            while let Some(v) = ds2.pop() {
                let v = v as usize;
                // deletions renumber vertices, so entries can go stale; the
                // outer rescan catches anything missed
                if v >= self.p || self.order(v) >= 3 {
                    continue;
                }
                match self.order(v) {
                    0 => self.delete_vertex(v),
                    1 => self.collapse_order1(v, &mut ds2)?,
                    _ => self.collapse_order2(v, &mut ds2)?,
                }
            }
        }
        self.ds2 = ds2;
        Ok(())
    }

    /// Remove a dangling vertex and its single edge.
    fn collapse_order1(&mut self, v: usize, ds2: &mut Vec<u32>) -> Result<(), VoroError> {
        let a = self.nbr(v, 0) as usize;
        self.remove_entry(a, v as u32)?;
        if self.order(a) < 3 {
            ds2.push(a as u32);
        }
        self.delete_vertex(v);
        Ok(())
    }

    /// Fuse out an order-2 vertex: splice its two edges together, or delete
    /// them when the endpoints are already adjacent (a double edge would
    /// otherwise appear).
    fn collapse_order2(&mut self, v: usize, ds2: &mut Vec<u32>) -> Result<(), VoroError> {
        let a = self.nbr(v, 0) as usize;
        let b = self.nbr(v, 1) as usize;
        if a == b {
            // both edges run to the same vertex; drop one side, then the other
            self.remove_entry(a, v as u32)?;
            self.free_record(self.order(v), self.record_slot(v));
            let s = self.alloc_record(1, v as u32);
            self.set_order(v, 1, s);
            self.set_nbr(v, 0, a as u32);
            let pa = self.position_of(a, v as u32)?;
            self.set_back(v, 0, pa);
            self.set_back(a, pa, 0);
            return self.collapse_order1(v, ds2);
        }
        let adjacent = (0..self.order(a)).any(|mm| self.nbr(a, mm) as usize == b);
        if adjacent {
            self.remove_entry(a, v as u32)?;
            self.remove_entry(b, v as u32)?;
            if self.order(a) < 3 {
                ds2.push(a as u32);
            }
            if self.order(b) < 3 {
                ds2.push(b as u32);
            }
        } else {
            let pa = self.back(v, 0);
            let pb = self.back(v, 1);
            self.set_nbr(a, pa, b as u32);
            self.set_nbr(b, pb, a as u32);
            self.set_back(a, pa, pb);
            self.set_back(b, pb, pa);
        }
        self.delete_vertex(v);
        Ok(())
    }

    /// Rebuild `a`'s record without its entry pointing at `target`, fixing
    /// the back-indices of every shifted neighbour.
    fn remove_entry(&mut self, a: usize, target: u32) -> Result<(), VoroError> {
        let k = self.order(a);
        let pos = self.position_of(a, target)?;
        let mut nbrs = Vec::with_capacity(k - 1);
        let mut backs = Vec::with_capacity(k - 1);
        let mut tags = Vec::with_capacity(k - 1);
        for mm in 0..k {
            if mm == pos {
                continue;
            }
            nbrs.push(self.nbr(a, mm));
            backs.push(self.back(a, mm));
            tags.push(self.tag(a, mm));
        }
        self.free_record(k, self.record_slot(a));
        let s = self.alloc_record(k - 1, a as u32);
        self.set_order(a, k - 1, s);
        for mm in 0..k - 1 {
            self.set_nbr(a, mm, nbrs[mm]);
            self.set_back(a, mm, backs[mm]);
            self.set_tag(a, mm, tags[mm]);
            let j = nbrs[mm] as usize;
            self.set_back(j, backs[mm], mm);
        }
        Ok(())
    }
}

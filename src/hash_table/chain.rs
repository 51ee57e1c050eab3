use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem;

/// Final position of a [`ChainNode`].
///
/// Only the last node of a chain may hold a value here. Every other node
/// links onward and keeps its three inline positions full.
pub(crate) enum Tail<V> {
    Vacant,
    Value(V),
    Link(Box<ChainNode<V>>),
}

/// Four inline element positions used once a slot holds more than one
/// element.
///
/// A chain is a dense positional sequence: node `k` holds positions `3k`,
/// `3k + 1` and `3k + 2`, and the last node may also hold `3k + 3` in its
/// tail. `zero` is always occupied; a node that would become empty is unlinked
/// by its owner instead.
pub(crate) struct ChainNode<V> {
    zero: V,
    one: Option<V>,
    two: Option<V>,
    three: Tail<V>,
}

impl<V> ChainNode<V> {
    pub(crate) fn pair(first: V, second: V) -> Self {
        Self {
            zero: first,
            one: Some(second),
            two: None,
            three: Tail::Vacant,
        }
    }

    pub(crate) fn iter(&self) -> ChainIter<'_, V> {
        ChainIter {
            node: Some(self),
            offset: 0,
        }
    }

    /// Number of elements in the whole chain.
    pub(crate) fn len(&self) -> usize {
        self.iter().count()
    }

    /// Number of nodes in the whole chain.
    pub(crate) fn nodes(&self) -> usize {
        let mut count = 1;
        let mut node = self;
        while let Tail::Link(next) = &node.three {
            node = &**next;
            count += 1;
        }
        count
    }

    pub(crate) fn first(&self) -> &V {
        &self.zero
    }

    pub(crate) fn last(&self) -> &V {
        let (node, _) = self.tail();
        match &node.three {
            Tail::Value(value) => value,
            _ => node
                .two
                .as_ref()
                .or(node.one.as_ref())
                .unwrap_or(&node.zero),
        }
    }

    pub(crate) fn get(&self, mut position: usize) -> Option<&V> {
        let mut node = self;
        while position >= 3 {
            match &node.three {
                Tail::Link(next) => {
                    node = &**next;
                    position -= 3;
                }
                Tail::Value(value) if position == 3 => return Some(value),
                _ => return None,
            }
        }

        match position {
            0 => Some(&node.zero),
            1 => node.one.as_ref(),
            _ => node.two.as_ref(),
        }
    }

    pub(crate) fn get_mut(&mut self, mut position: usize) -> Option<&mut V> {
        let mut node = self;
        while position >= 3 {
            match node.three {
                Tail::Link(ref mut next) => {
                    node = &mut **next;
                    position -= 3;
                }
                Tail::Value(ref mut value) if position == 3 => return Some(value),
                _ => return None,
            }
        }

        match position {
            0 => Some(&mut node.zero),
            1 => node.one.as_mut(),
            _ => node.two.as_mut(),
        }
    }

    pub(crate) fn position(&self, eq: impl Fn(&V) -> bool) -> Option<usize> {
        self.iter().position(eq)
    }

    /// Appends `value` at the end of the chain without comparing it to the
    /// stored elements. Returns the position it was written to.
    pub(crate) fn push(&mut self, value: V) -> usize {
        let (node, base) = self.tail_mut();
        if node.one.is_none() {
            node.one = Some(value);
            return base + 1;
        }
        if node.two.is_none() {
            node.two = Some(value);
            return base + 2;
        }

        match mem::replace(&mut node.three, Tail::Vacant) {
            Tail::Vacant => {
                node.three = Tail::Value(value);
                base + 3
            }
            Tail::Value(previous) => {
                node.three = Tail::Link(Box::new(Self::pair(previous, value)));
                base + 4
            }
            Tail::Link(_) => unreachable!("tail_mut stops at the last node"),
        }
    }

    /// Removes the element at `position`, moving the chain's last element into
    /// the hole. Returns the removed element and what is left of the chain, if
    /// anything.
    ///
    /// # Panics
    ///
    /// Panics if `position` is not occupied.
    pub(crate) fn remove(mut self: Box<Self>, position: usize) -> (V, Option<Box<Self>>) {
        let Some((last, len)) = self.pop_last() else {
            assert_eq!(position, 0, "chain position {position} out of range");
            return (self.zero, None);
        };

        if position == len {
            debug_assert!(self.is_packed());
            return (last, Some(self));
        }

        let Some(hole) = self.get_mut(position) else {
            panic!("chain position {position} out of range");
        };
        let removed = mem::replace(hole, last);
        debug_assert!(self.is_packed());
        (removed, Some(self))
    }

    /// Takes the last element of the chain in one walk, unlinking the last
    /// node when it empties. Returns the element and the chain length left
    /// behind, or `None` when only `zero` of this node is left.
    fn pop_last(&mut self) -> Option<(V, usize)> {
        let mut node = self;
        let mut base = 0;
        loop {
            let emptying = match &node.three {
                Tail::Link(next) => {
                    !matches!(next.three, Tail::Link(_)) && next.one.is_none()
                }
                _ => break,
            };
            if emptying {
                let Tail::Link(emptied) = mem::replace(&mut node.three, Tail::Vacant) else {
                    unreachable!("checked above");
                };
                return Some((emptied.zero, base + 3));
            }
            match node.three {
                Tail::Link(ref mut next) => node = &mut **next,
                _ => unreachable!("checked above"),
            }
            base += 3;
        }

        match mem::replace(&mut node.three, Tail::Vacant) {
            Tail::Value(value) => Some((value, base + 3)),
            Tail::Vacant => {
                if let Some(value) = node.two.take() {
                    Some((value, base + 2))
                } else {
                    node.one.take().map(|value| (value, base + 1))
                }
            }
            Tail::Link(_) => unreachable!("the walk stops at the last node"),
        }
    }

    fn tail(&self) -> (&Self, usize) {
        let mut node = self;
        let mut base = 0;
        while let Tail::Link(next) = &node.three {
            node = &**next;
            base += 3;
        }
        (node, base)
    }

    fn tail_mut(&mut self) -> (&mut Self, usize) {
        let mut node = self;
        let mut base = 0;
        loop {
            match node.three {
                Tail::Link(ref mut next) => {
                    node = &mut **next;
                    base += 3;
                }
                _ => return (node, base),
            }
        }
    }

    /// Consumes the chain, handing every element to `f` in chain order.
    pub(crate) fn into_values(self: Box<Self>, mut f: impl FnMut(V)) {
        let mut node = *self;
        loop {
            let ChainNode {
                zero,
                one,
                two,
                three,
            } = node;
            f(zero);
            if let Some(value) = one {
                f(value);
            }
            if let Some(value) = two {
                f(value);
            }

            match three {
                Tail::Link(next) => node = *next,
                Tail::Value(value) => {
                    f(value);
                    return;
                }
                Tail::Vacant => return,
            }
        }
    }

    /// Detaches every linked node one at a time so dropping a long chain does
    /// not recurse once per node.
    pub(crate) fn unlink(&mut self) {
        let mut next = mem::replace(&mut self.three, Tail::Vacant);
        while let Tail::Link(mut node) = next {
            next = mem::replace(&mut node.three, Tail::Vacant);
        }
    }

    /// Whether every node but the last is full and the last node has no
    /// interior holes.
    pub(crate) fn is_packed(&self) -> bool {
        let mut node = self;
        loop {
            match &node.three {
                Tail::Link(next) => {
                    if node.one.is_none() || node.two.is_none() {
                        return false;
                    }
                    node = &**next;
                }
                Tail::Value(_) => return node.one.is_some() && node.two.is_some(),
                Tail::Vacant => return node.one.is_some() || node.two.is_none(),
            }
        }
    }
}

impl<V: Clone> ChainNode<V> {
    /// Deep copy, built back to front so long chains are copied without
    /// recursion.
    pub(crate) fn copy(&self) -> Box<Self> {
        let mut parts = Vec::with_capacity(self.nodes());
        let mut node = self;
        loop {
            parts.push(node);
            match &node.three {
                Tail::Link(next) => node = &**next,
                _ => break,
            }
        }

        let mut tail: Option<Box<Self>> = None;
        for part in parts.into_iter().rev() {
            let three = match tail.take() {
                Some(next) => Tail::Link(next),
                None => match &part.three {
                    Tail::Value(value) => Tail::Value(value.clone()),
                    _ => Tail::Vacant,
                },
            };
            tail = Some(Box::new(Self {
                zero: part.zero.clone(),
                one: part.one.clone(),
                two: part.two.clone(),
                three,
            }));
        }

        tail.unwrap_or_else(|| unreachable!("a chain has at least one node"))
    }
}

/// Yields the elements of a chain in position order.
pub(crate) struct ChainIter<'a, V> {
    node: Option<&'a ChainNode<V>>,
    offset: u8,
}

impl<'a, V> Iterator for ChainIter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.node?;
            match self.offset {
                0 => {
                    self.offset = 1;
                    return Some(&node.zero);
                }
                1 => {
                    self.offset = 2;
                    if let Some(value) = &node.one {
                        return Some(value);
                    }
                    self.node = None;
                }
                2 => {
                    self.offset = 3;
                    if let Some(value) = &node.two {
                        return Some(value);
                    }
                    self.node = None;
                }
                _ => match &node.three {
                    Tail::Link(next) => {
                        self.node = Some(&**next);
                        self.offset = 0;
                    }
                    Tail::Value(value) => {
                        self.node = None;
                        return Some(value);
                    }
                    Tail::Vacant => self.node = None,
                },
            }
        }
    }
}

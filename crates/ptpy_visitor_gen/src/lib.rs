//! Macros for declaring visitor traits.
//!
//! Each `visit` entry generates a free `walk_*` function holding the default traversal
//! and a trait method `visit_*` that calls it. Implementors override only the methods
//! they care about and call the matching `walk_*` function to keep descending.

#[doc(hidden)]
pub use paste;

/// Creates a mut visitor
#[macro_export]
macro_rules! visit_mut {
    (
        $trait_vis:vis trait $id:ident {
            $($vis:vis visit ($visitor_id:ident, $visited_id:ident: &mut $visited:ident) -> Result<()> $block:block)+
        }
    ) => {
        $(
        $crate::paste::paste! {
            $vis fn [<walk_ $visited:snake _mut>]<V: $id + ?Sized>($visitor_id: &mut V, $visited_id: &mut $visited) -> std::result::Result<(), V::Err> {
                $block
            }
        }
        )*

        $trait_vis trait $id {
            type Err;

            $(
            $crate::paste::paste! {
                fn [<visit_ $visited:snake _mut>](&mut self, $visited_id: &mut $visited) -> std::result::Result<(), Self::Err> {
                    [<walk_ $visited:snake _mut>](self, $visited_id)
                }
            }
            )*
        }
    };
}

/// Creates a visitor
#[macro_export]
macro_rules! visit {
    (
        $trait_vis:vis trait $id:ident {
            $($vis:vis visit ($visitor_id:ident, $visited_id:ident: &$visited:ident) -> Result<()> $block:block)+
        }
    ) => {
        $(
        $crate::paste::paste! {
            $vis fn [<walk_ $visited:snake>]<V: $id + ?Sized>($visitor_id: &mut V, $visited_id: &$visited) -> std::result::Result<(), V::Err> {
                $block
            }
        }
        )*

        $trait_vis trait $id {
            type Err;

            $(
            $crate::paste::paste! {
                fn [<visit_ $visited:snake>](&mut self, $visited_id: &$visited) -> std::result::Result<(), Self::Err> {
                    [<walk_ $visited:snake>](self, $visited_id)
                }
            }
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    pub struct Leaf(i32);
    pub struct Pair(Leaf, Leaf);

    visit_mut! {
        pub trait PairVisitorMut {
            pub visit (v, pair: &mut Pair) -> Result<()> {
                v.visit_leaf_mut(&mut pair.0)?;
                v.visit_leaf_mut(&mut pair.1)
            }
            pub visit (_v, _leaf: &mut Leaf) -> Result<()> {
                Ok(())
            }
        }
    }

    visit! {
        pub trait PairVisitor {
            pub visit (v, pair: &Pair) -> Result<()> {
                v.visit_leaf(&pair.0)?;
                v.visit_leaf(&pair.1)
            }
            pub visit (_v, _leaf: &Leaf) -> Result<()> {
                Ok(())
            }
        }
    }

    struct Doubler;

    impl PairVisitorMut for Doubler {
        type Err = ();

        fn visit_leaf_mut(&mut self, leaf: &mut Leaf) -> Result<(), Self::Err> {
            leaf.0 *= 2;
            Ok(())
        }
    }

    struct Summer(i32);

    impl PairVisitor for Summer {
        type Err = ();

        fn visit_leaf(&mut self, leaf: &Leaf) -> Result<(), Self::Err> {
            self.0 += leaf.0;
            walk_leaf(self, leaf)
        }
    }

    #[test]
    fn default_methods_walk_children() {
        let mut pair = Pair(Leaf(1), Leaf(2));
        Doubler.visit_pair_mut(&mut pair).unwrap();
        assert_eq!((pair.0 .0, pair.1 .0), (2, 4));

        let mut summer = Summer(0);
        summer.visit_pair(&pair).unwrap();
        assert_eq!(summer.0, 6);
    }
}

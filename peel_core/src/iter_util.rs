use crate::error::*;

use anyhow::anyhow;

/// Iterator extension for extracting a single item
pub trait Single {
    type Item;

    fn single(&mut self) -> PeelResult<Self::Item>;
    fn single_or_none(&mut self) -> PeelResult<Option<Self::Item>>;
}

impl<I> Single for I
where
    I: Iterator,
{
    type Item = I::Item;

    fn single(&mut self) -> PeelResult<Self::Item> {
        match self.next() {
            None => Err(anyhow!("expected a single item, got none").into()),
            Some(item) => match self.next() {
                Some(_) => Err(anyhow!("expected a single item, got more than one").into()),
                None => Ok(item),
            },
        }
    }

    fn single_or_none(&mut self) -> PeelResult<Option<Self::Item>> {
        match self.next() {
            None => Ok(None),
            Some(item) => match self.next() {
                Some(_) => Err(anyhow!("expected a single item, got more than one").into()),
                None => Ok(Some(item)),
            },
        }
    }
}

use crate::gif::GifRef;

/// Ordered search hits in provider rank order, plus the pagination offset the
/// next "load more" should start from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    gifs: Vec<GifRef>,
    page_cursor: u32,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gifs(&self) -> &[GifRef] {
        &self.gifs
    }

    pub fn get(&self, index: usize) -> Option<&GifRef> {
        self.gifs.get(index)
    }

    pub fn len(&self) -> usize {
        self.gifs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gifs.is_empty()
    }

    pub fn page_cursor(&self) -> u32 {
        self.page_cursor
    }

    /// First page of a new query. The cursor goes back to zero.
    pub fn replace(&mut self, gifs: Vec<GifRef>) {
        self.gifs = gifs;
        self.page_cursor = 0;
    }

    pub fn append(&mut self, gifs: Vec<GifRef>) {
        self.gifs.extend(gifs);
    }

    /// Moves the cursor one page forward and returns the new offset.
    pub fn advance(&mut self, page_size: u32) -> u32 {
        self.page_cursor += page_size;
        self.page_cursor
    }

    pub fn clear(&mut self) {
        self.gifs.clear();
        self.page_cursor = 0;
    }
}

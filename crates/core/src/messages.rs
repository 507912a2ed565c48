use serde::Serialize;

/// Structured part of a bot message. Only `BotMessage::text` is ever spoken;
/// blocks are rendered visually.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    List {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        items: Vec<String>,
    },
    Suggestions { generation: u64, options: Vec<String> },
    File { file_name: String, size_bytes: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BotMessage {
    pub text: String,
    pub blocks: Vec<Block>,
    pub speak: bool,
}

impl BotMessage {
    pub fn text(text: impl Into<String>) -> Self {
        MessageBuilder::new(text).build()
    }

    pub fn suggestions(&self) -> Option<(u64, &[String])> {
        self.blocks.iter().find_map(|block| match block {
            Block::Suggestions { generation, options } => Some((*generation, options.as_slice())),
            _ => None,
        })
    }
}

pub struct MessageBuilder {
    text: String,
    blocks: Vec<Block>,
    speak: bool,
}

impl MessageBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), blocks: Vec::new(), speak: true }
    }

    pub fn list<I, S>(mut self, title: Option<&str>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocks.push(Block::List {
            title: title.map(str::to_string),
            items: items.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn suggestions(mut self, generation: u64, options: Vec<String>) -> Self {
        self.blocks.push(Block::Suggestions { generation, options });
        self
    }

    pub fn file(mut self, file_name: impl Into<String>, size_bytes: usize) -> Self {
        self.blocks.push(Block::File { file_name: file_name.into(), size_bytes });
        self
    }

    /// Visual-only message, never sent to speech output.
    pub fn silent(mut self) -> Self {
        self.speak = false;
        self
    }

    pub fn build(self) -> BotMessage {
        BotMessage { text: self.text, blocks: self.blocks, speak: self.speak }
    }
}

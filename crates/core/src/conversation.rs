//! Conversation-related types.

use hotel_assistant_model::{
    AssistantMessage, ModelMessage, ToolCallRequest, ToolCallResult,
};
use serde::Serialize;

/// Who produced a conversation item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The initial instructions.
    System,
    /// The guest.
    User,
    /// A reply meant for the guest.
    Assistant,
    /// An assistant message that only asks for tools.
    ToolRequest,
    /// The output of a tool.
    ToolResult,
}

impl Role {
    /// Returns `true` if items of this role are shown to the guest.
    #[inline]
    pub fn is_visible(self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

/// Represents a conversation.
///
/// The caller owns the conversation for the lifetime of a chat session
/// and lends it to the orchestrator for each turn. Items are only ever
/// appended.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    pub(crate) items: Vec<Item>,
}

impl Conversation {
    /// Creates a conversation that starts with the given system prompt.
    pub fn with_system_prompt<S: Into<String>>(prompt: S) -> Self {
        let mut conversation = Self::default();
        conversation.push_system(prompt);
        conversation
    }

    /// Appends a system message.
    pub fn push_system<S: Into<String>>(&mut self, prompt: S) {
        let prompt = prompt.into();
        self.items.push(Item {
            msg: ModelMessage::System(prompt.clone()),
            transcript: prompt,
        });
    }

    /// Appends a guest message.
    pub fn push_user<S: Into<String>>(&mut self, input: S) {
        let input = input.into();
        self.items.push(Item {
            msg: ModelMessage::User(input.clone()),
            transcript: input,
        });
    }

    #[inline]
    pub(crate) fn push_assistant(&mut self, reply: String) {
        self.items.push(Item {
            msg: ModelMessage::Assistant(AssistantMessage::text(reply.clone())),
            transcript: reply,
        });
    }

    #[inline]
    pub(crate) fn push_tool_request(
        &mut self,
        content: String,
        tool_calls: Vec<ToolCallRequest>,
    ) {
        self.items.push(Item {
            msg: ModelMessage::Assistant(AssistantMessage {
                content: content.clone(),
                tool_calls,
            }),
            transcript: content,
        });
    }

    #[inline]
    pub(crate) fn push_tool_result(&mut self, result: ToolCallResult) {
        let transcript = result.content.clone();
        self.items.push(Item {
            msg: ModelMessage::Tool(result),
            transcript,
        });
    }

    /// Returns all items, oldest first.
    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the items a guest should see: their own messages and the
    /// assistant replies. System prompts and tool traffic are skipped.
    pub fn visible_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.role().is_visible())
    }

    /// Returns the role of the most recent item.
    #[inline]
    pub fn last_role(&self) -> Option<Role> {
        self.items.last().map(Item::role)
    }

    /// Returns the number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the conversation has no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn messages(&self) -> Vec<ModelMessage> {
        self.items.iter().map(|item| item.msg.clone()).collect()
    }
}

/// An item in the conversation.
#[derive(Clone, Debug)]
pub struct Item {
    pub(crate) msg: ModelMessage,
    pub(crate) transcript: String,
}

impl Item {
    /// Returns the role of this item.
    pub fn role(&self) -> Role {
        match &self.msg {
            ModelMessage::System(_) => Role::System,
            ModelMessage::User(_) => Role::User,
            ModelMessage::Assistant(msg) if msg.tool_calls.is_empty() => {
                Role::Assistant
            }
            ModelMessage::Assistant(_) => Role::ToolRequest,
            ModelMessage::Tool(_) => Role::ToolResult,
        }
    }

    /// Returns the transcript of this item.
    ///
    /// The transcript is the text of the message. For tool results it is
    /// the serialized result, and for tool requests it is whatever text the
    /// model produced next to the calls.
    #[inline]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Returns the underlying model message.
    #[inline]
    pub fn message(&self) -> &ModelMessage {
        &self.msg
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_visible_items_skip_tool_traffic() {
        let mut conversation = Conversation::with_system_prompt("Be nice.");
        conversation.push_user("Do you sell water?");
        conversation.push_tool_request(
            String::new(),
            vec![ToolCallRequest {
                id: "call_1".to_owned(),
                name: "get_items".to_owned(),
                arguments: json!({ "ids": "1" }),
            }],
        );
        conversation.push_tool_result(ToolCallResult {
            id: "call_1".to_owned(),
            name: "get_items".to_owned(),
            content: "[{\"id\":1}]".to_owned(),
        });
        conversation.push_assistant("Yes, water is 1.0.".to_owned());

        let visible: Vec<_> = conversation
            .visible_items()
            .map(|item| (item.role(), item.transcript()))
            .collect();
        assert_eq!(
            visible,
            vec![
                (Role::User, "Do you sell water?"),
                (Role::Assistant, "Yes, water is 1.0."),
            ]
        );
        assert_eq!(conversation.len(), 5);
        assert_eq!(conversation.last_role(), Some(Role::Assistant));
    }

    #[test]
    fn test_messages_keep_order() {
        let mut conversation = Conversation::default();
        assert!(conversation.is_empty());
        assert_eq!(conversation.last_role(), None);

        conversation.push_system("prompt");
        conversation.push_user("hi");
        assert_eq!(
            conversation.messages(),
            vec![
                ModelMessage::System("prompt".to_owned()),
                ModelMessage::User("hi".to_owned()),
            ]
        );
    }
}

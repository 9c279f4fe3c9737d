//! ワイヤー上のテキストフレームの分類と整形
//!
//! 受信: `@<username> <body>` は宛先指定メッセージ、それ以外は全てブロードキャスト。
//! 送信: ブロードキャストは `<sender>: <body>`、宛先指定は `(Private) <sender>: <body>`。

use super::value_object::Username;

/// 宛先指定メッセージの接頭辞
pub const DIRECTED_SIGIL: char = '@';

/// 受信フレームの分類結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundFrame<'a> {
    /// `@<target> <body>`
    Directed { target: &'a str, body: &'a str },
    /// 本文全体をそのままルームへ配信する
    Broadcast(&'a str),
    /// `@` で始まるが本文がない（空白がない）。黙って破棄する
    Malformed,
}

impl<'a> InboundFrame<'a> {
    pub fn parse(text: &'a str) -> Self {
        match text.strip_prefix(DIRECTED_SIGIL) {
            Some(directive) => match directive.split_once(' ') {
                Some((target, body)) => Self::Directed { target, body },
                None => Self::Malformed,
            },
            None => Self::Broadcast(text),
        }
    }
}

/// ブロードキャスト用の送信フレーム
pub fn broadcast_frame(sender: &Username, text: &str) -> String {
    format!("{}: {}", sender, text)
}

/// 宛先指定用の送信フレーム
pub fn private_frame(sender: &Username, body: &str) -> String {
    format!("(Private) {}: {}", sender, body)
}

/// 参加時の履歴エントリ
pub fn joined_entry(username: &Username) -> String {
    format!("{} joined the room", username)
}

/// 退出時の履歴エントリ
pub fn left_entry(username: &Username) -> String {
    format!("{} left the room", username)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn username(value: &str) -> Username {
        Username::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_parse_plain_text_as_broadcast() {
        // テスト項目: @ で始まらないテキストはブロードキャストになる
        // given (前提条件):
        let text = "hello everyone";

        // when (操作):
        let frame = InboundFrame::parse(text);

        // then (期待する結果):
        assert_eq!(frame, InboundFrame::Broadcast("hello everyone"));
    }

    #[test]
    fn test_parse_empty_text_as_broadcast() {
        // テスト項目: 空のテキストもブロードキャストとして扱われる（フィルタしない）
        // given (前提条件):

        // when (操作):
        let frame = InboundFrame::parse("");

        // then (期待する結果):
        assert_eq!(frame, InboundFrame::Broadcast(""));
    }

    #[test]
    fn test_parse_directed_message_splits_at_first_space() {
        // テスト項目: 宛先は最初の空白まで、本文は残り全て
        // given (前提条件):
        let text = "@alice hi there, alice";

        // when (操作):
        let frame = InboundFrame::parse(text);

        // then (期待する結果):
        assert_eq!(
            frame,
            InboundFrame::Directed {
                target: "alice",
                body: "hi there, alice",
            }
        );
    }

    #[test]
    fn test_parse_directive_without_body_is_malformed() {
        // テスト項目: 空白のない宛先指定は不正フレームになる
        // given (前提条件):
        let text = "@alice";

        // when (操作):
        let frame = InboundFrame::parse(text);

        // then (期待する結果):
        assert_eq!(frame, InboundFrame::Malformed);
    }

    #[test]
    fn test_parse_directive_with_trailing_space_has_empty_body() {
        // テスト項目: 宛先の後に空白だけがある場合は本文が空の宛先指定になる
        // given (前提条件):
        let text = "@alice ";

        // when (操作):
        let frame = InboundFrame::parse(text);

        // then (期待する結果):
        assert_eq!(
            frame,
            InboundFrame::Directed {
                target: "alice",
                body: "",
            }
        );
    }

    #[test]
    fn test_outbound_frames_format() {
        // テスト項目: 送信フレームと履歴エントリの書式
        // given (前提条件):
        let bob = username("bob");

        // when (操作):

        // then (期待する結果):
        assert_eq!(broadcast_frame(&bob, "hello"), "bob: hello");
        assert_eq!(private_frame(&bob, "hi"), "(Private) bob: hi");
        assert_eq!(joined_entry(&bob), "bob joined the room");
        assert_eq!(left_entry(&bob), "bob left the room");
    }
}

// tycoon_protocol — wire protocol for multiplayer relay communication.
//
// This crate defines the message types, framing, and binary serialization
// used by the relay (`tycoon_relay`) and game clients to communicate over
// TCP. It is shared between both sides.
//
// Module overview:
// - `wire.rs`:    Byte-level primitives — `Writer`/`Reader` for big-endian
//                 integers, length-prefixed strings, and `DecodeError`.
// - `message.rs`: The `Message` enum (one variant per wire tag) and the
//                 field-by-field encodings of the domain types.
// - `framing.rs`: Length-delimited framing over any `Read`/`Write` stream:
//                 4-byte big-endian length prefix, then the encoded payload.
//
// Design decisions:
// - **Hand-rolled binary encoding.** Every field goes on the wire
//   explicitly, in a fixed order, big-endian. No schema, no reflection:
//   the encoders in `message.rs` are the format definition.
// - **Strict decoding.** Unknown tags, unknown ordinals, truncated buffers,
//   and trailing bytes are all hard errors, never silently skipped. A peer
//   that sends garbage is disconnected, not accommodated.
// - **No async runtime.** Uses `std::io::Read`/`Write` for framing,
//   compatible with both blocking TCP streams and buffered wrappers.

pub mod framing;
pub mod message;
pub mod wire;

pub use framing::{MAX_FRAME_SIZE, read_frame, write_frame};
pub use message::Message;
pub use wire::DecodeError;

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tycoon_engine::{
        ActionKind, Card, CardId, CardKind, Player, PropertyColor, RentRequest, RentResponse,
        TheftRequest, TheftResponse, Turn,
    };

    use super::*;

    /// Encode a message, frame it, read it back, decode, compare.
    fn roundtrip(msg: &Message) {
        let bytes = msg.encode();
        let mut wire = Vec::new();
        write_frame(&mut wire, &bytes).unwrap();

        let mut cursor = Cursor::new(&wire);
        let recovered_bytes = read_frame(&mut cursor).unwrap();
        let recovered = Message::decode(&recovered_bytes).unwrap();
        assert_eq!(&recovered, msg);
    }

    fn money_card(id: u32, value: i32) -> Card {
        Card {
            id: CardId(id),
            name: format!("{value}M"),
            kind: CardKind::Money,
            value,
            color: PropertyColor::None,
            alt_color: PropertyColor::None,
            image_path: format!("art/{value}m.png"),
            sound_path: "audio/money.ogg".into(),
            action: None,
            flipped: false,
        }
    }

    fn property_card(id: u32, name: &str, color: PropertyColor, value: i32) -> Card {
        Card {
            id: CardId(id),
            name: name.into(),
            kind: CardKind::Property,
            value,
            color,
            alt_color: PropertyColor::None,
            image_path: String::new(),
            sound_path: String::new(),
            action: None,
            flipped: false,
        }
    }

    fn action_card(id: u32, name: &str, kind: ActionKind, value: i32) -> Card {
        Card {
            id: CardId(id),
            name: name.into(),
            kind: CardKind::Action,
            value,
            color: PropertyColor::None,
            alt_color: PropertyColor::None,
            image_path: String::new(),
            sound_path: String::new(),
            action: Some(kind),
            flipped: false,
        }
    }

    fn sample_player(name: &str) -> Player {
        let mut player = Player::new(name);
        player.hand.push(money_card(1, 5));
        player
            .hand
            .push(property_card(2, "Boardwalk", PropertyColor::DarkBlue, 4));
        player.in_play[0].push(money_card(3, 1));
        player.in_play.push(vec![
            property_card(4, "Baltic Avenue", PropertyColor::Brown, 1),
            property_card(5, "Mediterranean Avenue", PropertyColor::Brown, 1),
        ]);
        player
    }

    #[test]
    fn roundtrip_update_player() {
        roundtrip(&Message::UpdatePlayer(sample_player("Alice")));
    }

    #[test]
    fn roundtrip_update_player_fresh() {
        // A just-joined player: empty hand, only the empty money pile.
        roundtrip(&Message::UpdatePlayer(Player::new("Bob")));
    }

    #[test]
    fn roundtrip_update_player_list() {
        roundtrip(&Message::UpdatePlayerList(vec![
            sample_player("Alice"),
            sample_player("Bob"),
            Player::new("Carol"),
        ]));
    }

    #[test]
    fn roundtrip_update_player_list_empty() {
        roundtrip(&Message::UpdatePlayerList(Vec::new()));
    }

    #[test]
    fn roundtrip_update_deck() {
        roundtrip(&Message::UpdateDeck(vec![
            money_card(10, 1),
            property_card(11, "St. James Place", PropertyColor::Orange, 2),
            action_card(12, "Pass Go", ActionKind::PassGo, 1),
        ]));
    }

    #[test]
    fn roundtrip_update_deck_empty() {
        roundtrip(&Message::UpdateDeck(Vec::new()));
    }

    #[test]
    fn roundtrip_update_discard_pile() {
        roundtrip(&Message::UpdateDiscardPile(vec![action_card(
            13,
            "Just Say No",
            ActionKind::JustSayNo,
            4,
        )]));
    }

    #[test]
    fn roundtrip_update_turn() {
        roundtrip(&Message::UpdateTurn(Turn {
            current_owner: 2,
            actions_remaining: 1,
            game_over: false,
        }));
    }

    #[test]
    fn roundtrip_update_turn_game_over() {
        roundtrip(&Message::UpdateTurn(Turn {
            current_owner: 0,
            actions_remaining: 0,
            game_over: true,
        }));
    }

    #[test]
    fn roundtrip_request_deck() {
        roundtrip(&Message::RequestDeck);
    }

    #[test]
    fn roundtrip_request_player_list() {
        roundtrip(&Message::RequestPlayerList);
    }

    #[test]
    fn roundtrip_rent_request() {
        roundtrip(&Message::RentRequest(RentRequest {
            renter: "Alice".into(),
            rentees: vec!["Bob".into(), "Carol".into()],
            amount: 8,
            doubled: true,
        }));
    }

    #[test]
    fn roundtrip_rent_response() {
        roundtrip(&Message::RentResponse(RentResponse {
            renter: "Alice".into(),
            rentee: "Bob".into(),
            assets_given: vec![money_card(20, 5), money_card(21, 3)],
            accepted: true,
        }));
    }

    #[test]
    fn roundtrip_rent_response_rejected() {
        // A Just Say No rejection carries no assets.
        roundtrip(&Message::RentResponse(RentResponse {
            renter: "Alice".into(),
            rentee: "Bob".into(),
            assets_given: Vec::new(),
            accepted: false,
        }));
    }

    #[test]
    fn roundtrip_theft_request_sly_deal() {
        // Sly Deal gives nothing, takes one card.
        roundtrip(&Message::TheftRequest(TheftRequest {
            thief: "Alice".into(),
            victim: "Bob".into(),
            action: ActionKind::SlyDeal,
            card_to_give: None,
            cards_to_take: vec![property_card(30, "Oriental Avenue", PropertyColor::LightBlue, 1)],
        }));
    }

    #[test]
    fn roundtrip_theft_request_forced_deal() {
        roundtrip(&Message::TheftRequest(TheftRequest {
            thief: "Alice".into(),
            victim: "Bob".into(),
            action: ActionKind::ForcedDeal,
            card_to_give: Some(property_card(31, "Baltic Avenue", PropertyColor::Brown, 1)),
            cards_to_take: vec![property_card(32, "Park Place", PropertyColor::DarkBlue, 4)],
        }));
    }

    #[test]
    fn roundtrip_theft_request_dealbreaker() {
        // Dealbreaker takes a whole monopoly group.
        roundtrip(&Message::TheftRequest(TheftRequest {
            thief: "Alice".into(),
            victim: "Bob".into(),
            action: ActionKind::Dealbreaker,
            card_to_give: None,
            cards_to_take: vec![
                property_card(33, "Baltic Avenue", PropertyColor::Brown, 1),
                property_card(34, "Mediterranean Avenue", PropertyColor::Brown, 1),
            ],
        }));
    }

    #[test]
    fn roundtrip_theft_response() {
        roundtrip(&Message::TheftResponse(TheftResponse {
            thief: "Alice".into(),
            victim: "Bob".into(),
            accepted: false,
        }));
    }

    #[test]
    fn roundtrip_time_to_connect() {
        roundtrip(&Message::TimeToConnect);
    }

    #[test]
    fn roundtrip_launch_game() {
        roundtrip(&Message::LaunchGame);
    }

    #[test]
    fn roundtrip_wild_card_extremes() {
        // A wild property with no alternate color and no action id exercises
        // the edges of the card encoding in one payload.
        let wild = Card {
            id: CardId(u32::MAX - 1),
            name: "Property Wild Card".into(),
            kind: CardKind::Property,
            value: 0,
            color: PropertyColor::Wild,
            alt_color: PropertyColor::None,
            image_path: String::new(),
            sound_path: String::new(),
            action: None,
            flipped: true,
        };
        roundtrip(&Message::UpdateDeck(vec![wild]));
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        let err = Message::decode(&[0xEE]).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownTag(0xEE)));
    }

    #[test]
    fn decode_rejects_empty_buffer() {
        assert!(Message::decode(&[]).is_err());
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = Message::LaunchGame.encode();
        bytes.push(0x00);
        let err = Message::decode(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let bytes = Message::UpdateTurn(Turn {
            current_owner: 1,
            actions_remaining: 3,
            game_over: false,
        })
        .encode();
        let err = Message::decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn decode_rejects_bad_action_id() {
        let mut bytes = Message::TheftRequest(TheftRequest {
            thief: "Alice".into(),
            victim: "Bob".into(),
            action: ActionKind::SlyDeal,
            card_to_give: None,
            cards_to_take: Vec::new(),
        })
        .encode();
        // The action id lives right after the two length-prefixed names.
        let action_offset = 1 + 4 + 5 + 4 + 3;
        bytes[action_offset..action_offset + 4].copy_from_slice(&99i32.to_be_bytes());
        let err = Message::decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnknownOrdinal {
                what: "theft action id",
                value: 99
            }
        ));
    }

    #[test]
    fn theft_request_rejects_non_theft_action() {
        // PassGo (ordinal 0) is a legal action kind but not a theft.
        let mut bytes = Message::TheftRequest(TheftRequest {
            thief: "Alice".into(),
            victim: "Bob".into(),
            action: ActionKind::Dealbreaker,
            card_to_give: None,
            cards_to_take: Vec::new(),
        })
        .encode();
        let action_offset = 1 + 4 + 5 + 4 + 3;
        bytes[action_offset..action_offset + 4].copy_from_slice(&0i32.to_be_bytes());
        assert!(Message::decode(&bytes).is_err());
    }
}

//! WebSocket connection that feeds the push channel.
//!
//! [`StompSocket`] owns the browser `WebSocket` and its event handlers. It
//! performs the STOMP handshake, attaches itself to the [`PushChannel`] on
//! `CONNECTED`, routes inbound frames through [`PushChannel::deliver`] and
//! detaches on close. There is no automatic reconnect.

use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::config::WEBSOCKET_PATH;
use crate::core::PushChannel;
use crate::core::push::FrameSink;
use crate::core::stomp::{Command, Frame};

/// Outbound half handed to the channel once the handshake completes.
struct SocketSink {
    socket: WebSocket,
}

impl FrameSink for SocketSink {
    fn send(&self, frame: &Frame) {
        if let Err(err) = self.socket.send_with_str(&frame.encode()) {
            warn!("push frame {} not sent: {:?}", frame.command, err);
        }
    }
}

/// Live push connection. Dropping it closes the socket.
pub struct StompSocket {
    socket: WebSocket,
    channel: PushChannel,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl StompSocket {
    /// Open the connection for the current page origin.
    pub fn connect(channel: PushChannel) -> Result<Self, String> {
        let location = web_sys::window()
            .ok_or_else(|| "no window".to_string())?
            .location();
        let protocol = location.protocol().map_err(|err| format!("{:?}", err))?;
        let host = location.host().map_err(|err| format!("{:?}", err))?;
        let url = socket_url(&protocol, &host);

        let socket = WebSocket::new(&url).map_err(|err| format!("{:?}", err))?;
        info!("push channel connecting to {}", url);

        let on_open = {
            let socket = socket.clone();
            let host = host.clone();
            Closure::wrap(Box::new(move |_: Event| {
                if let Err(err) = socket.send_with_str(&Frame::connect(&host).encode()) {
                    warn!("STOMP handshake not sent: {:?}", err);
                }
            }) as Box<dyn FnMut(Event)>)
        };

        let on_message = {
            let socket = socket.clone();
            let channel = channel.clone();
            Closure::wrap(Box::new(move |event: MessageEvent| {
                let Some(text) = event.data().as_string() else {
                    warn!("ignoring binary push message");
                    return;
                };
                receive(&channel, &socket, &text);
            }) as Box<dyn FnMut(MessageEvent)>)
        };

        let on_close = {
            let channel = channel.clone();
            Closure::wrap(Box::new(move |event: CloseEvent| {
                info!("push channel closed (code {})", event.code());
                channel.detach();
            }) as Box<dyn FnMut(CloseEvent)>)
        };

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(Self {
            socket,
            channel,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
        })
    }
}

impl Drop for StompSocket {
    fn drop(&mut self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onclose(None);
        if self.channel.is_connected() {
            let _ = self.socket.send_with_str(&Frame::disconnect().encode());
        }
        self.channel.detach();
        let _ = self.socket.close();
    }
}

fn receive(channel: &PushChannel, socket: &WebSocket, text: &str) {
    let frames = match Frame::decode_all(text) {
        Ok(frames) => frames,
        Err(err) => {
            warn!("dropping undecodable push message: {}", err);
            return;
        }
    };
    for frame in frames {
        match frame.command {
            Command::Connected => {
                info!("push channel connected");
                channel.attach(Rc::new(SocketSink {
                    socket: socket.clone(),
                }));
            }
            _ => channel.deliver(&frame),
        }
    }
}

/// WebSocket URL on the page's own host, matching its TLS mode.
pub fn socket_url(protocol: &str, host: &str) -> String {
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    format!("{}://{}{}", scheme, host, WEBSOCKET_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_url_follows_page_scheme() {
        assert_eq!(
            socket_url("https:", "panel.example.org"),
            "wss://panel.example.org/api/websocket"
        );
        assert_eq!(
            socket_url("http:", "localhost:8080"),
            "ws://localhost:8080/api/websocket"
        );
    }
}

//! `sigil.scan(text)`: the one capability a surface gets

use futures::FutureExt;
use std::sync::Arc;

use crate::bridge::{IpcRenderer, IpcReply, SCAN_TEXT_CHANNEL};
use crate::surface::{CapabilityFn, ExposedWorld};

pub const SIGIL_NAMESPACE: &str = "sigil";
pub const SCAN_CAPABILITY: &str = "scan";

/// Typed handle over the renderer side of `scan-text`
#[derive(Debug, Clone)]
pub struct SigilApi {
    renderer: IpcRenderer,
}

impl SigilApi {
    pub fn new(renderer: IpcRenderer) -> Self {
        Self { renderer }
    }

    /// Ask the host to evaluate `text`
    pub async fn scan(&self, text: impl Into<String>) -> IpcReply {
        self.renderer.invoke(SCAN_TEXT_CHANNEL, text).await
    }

    /// Build the frozen world for a new surface: `sigil.scan` and nothing else
    pub fn expose(renderer: IpcRenderer) -> ExposedWorld {
        let api = SigilApi::new(renderer);
        let scan: CapabilityFn = Arc::new(move |text: String| {
            let api = api.clone();
            async move { api.scan(text).await }.boxed()
        });

        ExposedWorld::builder()
            .expose(SIGIL_NAMESPACE, SCAN_CAPABILITY, scan)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{
        ipc_channel, BridgeError, Evaluator, EvaluatorError, IpcMain, PrivilegedBridge,
        ScanVerdict,
    };
    use crate::surface::CapabilityError;
    use async_trait::async_trait;
    use serde_json::json;

    struct Upper;

    #[async_trait]
    impl Evaluator for Upper {
        async fn evaluate(&self, text: &str) -> Result<ScanVerdict, EvaluatorError> {
            Ok(ScanVerdict::new(json!(text.to_uppercase())))
        }
    }

    struct Refuses;

    #[async_trait]
    impl Evaluator for Refuses {
        async fn evaluate(&self, text: &str) -> Result<ScanVerdict, EvaluatorError> {
            Err(EvaluatorError::new(format!("refused: {}", text)))
        }
    }

    fn host(evaluator: Arc<dyn Evaluator>) -> (IpcMain, Arc<PrivilegedBridge>) {
        let bridge = Arc::new(PrivilegedBridge::new(evaluator));
        let mut ipc = IpcMain::new();
        bridge.clone().install(&mut ipc);
        (ipc, bridge)
    }

    #[test]
    fn test_world_exposes_only_scan() {
        let (renderer, _inbox) = ipc_channel();
        let world = SigilApi::expose(renderer);

        assert_eq!(world.namespaces().collect::<Vec<_>>(), vec![SIGIL_NAMESPACE]);
        assert_eq!(world.names(SIGIL_NAMESPACE), vec![SCAN_CAPABILITY]);
        assert!(world.resolve("ipcRenderer", "invoke").is_err());
        assert!(world.resolve(SIGIL_NAMESPACE, "evaluate").is_err());
    }

    #[tokio::test]
    async fn test_scan_through_world_reaches_evaluator_once() {
        let (ipc, bridge) = host(Arc::new(Upper));
        let (renderer, inbox) = ipc_channel();
        let world = SigilApi::expose(renderer);

        let client = async move {
            let verdict = world.call(SIGIL_NAMESPACE, SCAN_CAPABILITY, "jajaja").await;
            drop(world);
            verdict
        };
        let ((), verdict) = tokio::join!(ipc.serve(inbox), client);

        assert_eq!(verdict.unwrap().into_value(), json!("JAJAJA"));
        assert_eq!(bridge.invocations(), 1);
    }

    #[tokio::test]
    async fn test_rejected_evaluation_rejects_scan_with_same_error() {
        let (ipc, _bridge) = host(Arc::new(Refuses));
        let (renderer, inbox) = ipc_channel();
        let api = SigilApi::new(renderer);

        let client = async move {
            let reply = api.scan("lok").await;
            drop(api);
            reply
        };
        let ((), reply) = tokio::join!(ipc.serve(inbox), client);

        let expected = EvaluatorError::new("refused: lok");
        assert_eq!(reply, Err(BridgeError::Evaluator(expected.clone())));
        assert_eq!(reply.unwrap_err().to_string(), expected.to_string());
    }

    #[tokio::test]
    async fn test_misuse_never_reaches_the_host() {
        let (ipc, bridge) = host(Arc::new(Upper));
        let (renderer, inbox) = ipc_channel();
        let world = SigilApi::expose(renderer);

        let client = async move {
            let result = world.call("fs", "readFile", "/etc/shadow").await;
            drop(world);
            result
        };
        let ((), result) = tokio::join!(ipc.serve(inbox), client);

        assert!(matches!(result, Err(CapabilityError::Unresolved { .. })));
        assert_eq!(bridge.invocations(), 0);
    }
}

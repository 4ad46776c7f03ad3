//! JS exposure of the capability table
//!
//! `expose_in_main_world` copies a frozen `ExposedWorld` onto the global
//! object as plain frozen objects, one per namespace. Each function returns a
//! Promise that resolves with the verdict or rejects with the error message.

use serde::Serialize;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::bridge::{ipc_channel, IpcMain, PrivilegedBridge, ScanVerdict};
use crate::config::WeweConfig;
use crate::sigil::SecuritySigil;
use crate::surface::{CapabilityFn, ExposedWorld, SigilApi};

fn verdict_to_js(verdict: &ScanVerdict) -> Result<JsValue, JsValue> {
    verdict
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize verdict: {}", e)))
}

fn capability_to_js(capability: CapabilityFn) -> JsValue {
    let call = Closure::<dyn Fn(JsValue) -> js_sys::Promise>::new(move |arg: JsValue| {
        let capability = capability.clone();
        future_to_promise(async move {
            let text = arg
                .as_string()
                .ok_or_else(|| JsValue::from_str("Expected a string argument"))?;
            let verdict = capability(text)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            verdict_to_js(&verdict)
        })
    });
    call.into_js_value()
}

/// Install every namespace of `world` on `globalThis`, frozen
pub fn expose_in_main_world(world: &ExposedWorld) -> Result<(), JsValue> {
    let global = js_sys::global();
    for namespace in world.namespaces() {
        let object = js_sys::Object::new();
        for name in world.names(namespace) {
            let capability = world
                .resolve(namespace, name)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            js_sys::Reflect::set(&object, &JsValue::from_str(name), &capability_to_js(capability))?;
        }
        js_sys::Object::freeze(&object);
        js_sys::Reflect::set(&global, &JsValue::from_str(namespace), &object)?;
    }
    Ok(())
}

/// Host + surface wired inside one page
///
/// ```javascript,ignore
/// const host = new SigilHost();
/// host.openSurface();            // installs globalThis.sigil
/// await sigil.scan("jajaja");
/// ```
#[wasm_bindgen]
pub struct SigilHost {
    bridge: Arc<PrivilegedBridge>,
    renderer: crate::bridge::IpcRenderer,
}

#[wasm_bindgen]
impl SigilHost {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<SigilHost, JsValue> {
        let config = WeweConfig::from_js(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let bridge = Arc::new(PrivilegedBridge::new(Arc::new(SecuritySigil::with_config(
            config.sigil,
        ))));

        let mut ipc = IpcMain::new();
        bridge.clone().install(&mut ipc);
        let (renderer, inbox) = ipc_channel();
        wasm_bindgen_futures::spawn_local(async move {
            ipc.serve(inbox).await;
        });

        Ok(SigilHost { bridge, renderer })
    }

    /// Expose a fresh `sigil` namespace on the global object
    #[wasm_bindgen(js_name = openSurface)]
    pub fn open_surface(&self) -> Result<(), JsValue> {
        expose_in_main_world(&SigilApi::expose(self.renderer.clone()))
    }

    #[wasm_bindgen(getter)]
    pub fn invocations(&self) -> f64 {
        self.bridge.invocations() as f64
    }
}

/// FFI Bridge for Rust-Go Communication
/// Provides zero-copy, high-performance interop between Rust and Go services

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;
use std::slice;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{error, info, debug};

// Global state for managing callbacks and shared resources
static BRIDGE_STATE: Lazy<Arc<BridgeState>> = Lazy::new(|| {
    Arc::new(BridgeState::new())
});

/// Bridge state manager
pub struct BridgeState {
    callbacks: DashMap<String, Box<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>>,
    shared_buffers: DashMap<String, SharedBuffer>,
    metrics: RwLock<BridgeMetrics>,
}

/// Shared buffer for zero-copy data transfer
pub struct SharedBuffer {
    ptr: *mut u8,
    len: usize,
    capacity: usize,
}

unsafe impl Send for SharedBuffer {}
unsafe impl Sync for SharedBuffer {}

/// Bridge metrics for monitoring
#[derive(Default)]
pub struct BridgeMetrics {
    calls_total: u64,
    bytes_transferred: u64,
    errors_total: u64,
}

/// Standard message format for cross-language communication
#[derive(Serialize, Deserialize, Debug)]
pub struct BridgeMessage {
    pub id: String,
    pub operation: String,
    pub payload: Vec<u8>,
    pub metadata: std::collections::HashMap<String, String>,
}

/// Result type for FFI operations
#[repr(C)]
pub struct FFIResult {
    pub success: c_int,
    pub data: *mut u8,
    pub len: usize,
    pub error: *mut c_char,
}

impl BridgeState {
    fn new() -> Self {
        Self {
            callbacks: DashMap::new(),
            shared_buffers: DashMap::new(),
            metrics: RwLock::new(BridgeMetrics::default()),
        }
    }
}

// ============= Core FFI Functions =============

/// Initialize the FFI bridge
#[no_mangle]
pub extern "C" fn rust_bridge_init() -> c_int {
    tracing_subscriber::fmt::init();
    info!("Rust-Go FFI bridge initialized");
    0
}

/// Call a Rust function from Go
#[no_mangle]
pub extern "C" fn rust_bridge_call(
    operation: *const c_char,
    data: *const u8,
    len: usize,
) -> FFIResult {
    let result = unsafe {
        match CStr::from_ptr(operation).to_str() {
            Ok(op) => {
                let input = slice::from_raw_parts(data, len);
                process_operation(op, input)
            }
            Err(e) => {
                error!("Invalid operation string: {}", e);
                create_error_result("Invalid operation string")
            }
        }
    };
    
    // Update metrics
    BRIDGE_STATE.metrics.write().calls_total += 1;
    
    result
}

/// Register a callback that Go can invoke
#[no_mangle]
pub extern "C" fn rust_bridge_register_callback(
    name: *const c_char,
    callback: extern "C" fn(*const u8, usize) -> FFIResult,
) -> c_int {
    unsafe {
        match CStr::from_ptr(name).to_str() {
            Ok(callback_name) => {
                // Wrap the C callback in a Rust closure
                let rust_callback = move |data: &[u8]| -> Vec<u8> {
                    let result = callback(data.as_ptr(), data.len());
                    if result.success == 1 && !result.data.is_null() {
                        let output = slice::from_raw_parts(result.data, result.len).to_vec();
                        rust_bridge_free_result(result);
                        output
                    } else {
                        Vec::new()
                    }
                };
                
                BRIDGE_STATE.callbacks.insert(
                    callback_name.to_string(),
                    Box::new(rust_callback),
                );
                
                info!("Registered callback: {}", callback_name);
                0
            }
            Err(_) => -1,
        }
    }
}

/// Create a shared memory buffer
#[no_mangle]
pub extern "C" fn rust_bridge_create_shared_buffer(
    name: *const c_char,
    size: usize,
) -> *mut u8 {
    unsafe {
        match CStr::from_ptr(name).to_str() {
            Ok(buffer_name) => {
                let mut buffer = vec![0u8; size];
                let ptr = buffer.as_mut_ptr();
                
                let shared_buffer = SharedBuffer {
                    ptr,
                    len: 0,
                    capacity: size,
                };
                
                std::mem::forget(buffer); // Prevent deallocation
                BRIDGE_STATE.shared_buffers.insert(buffer_name.to_string(), shared_buffer);
                
                debug!("Created shared buffer '{}' with size {}", buffer_name, size);
                ptr
            }
            Err(_) => ptr::null_mut(),
        }
    }
}

/// Write to a shared buffer
#[no_mangle]
pub extern "C" fn rust_bridge_write_shared_buffer(
    name: *const c_char,
    data: *const u8,
    len: usize,
) -> c_int {
    unsafe {
        match CStr::from_ptr(name).to_str() {
            Ok(buffer_name) => {
                if let Some(mut buffer) = BRIDGE_STATE.shared_buffers.get_mut(buffer_name) {
                    if len <= buffer.capacity {
                        ptr::copy_nonoverlapping(data, buffer.ptr, len);
                        buffer.len = len;
                        
                        BRIDGE_STATE.metrics.write().bytes_transferred += len as u64;
                        0
                    } else {
                        -2 // Buffer too small
                    }
                } else {
                    -1 // Buffer not found
                }
            }
            Err(_) => -3, // Invalid name
        }
    }
}

/// Read from a shared buffer
#[no_mangle]
pub extern "C" fn rust_bridge_read_shared_buffer(
    name: *const c_char,
    output: *mut u8,
    max_len: usize,
) -> isize {
    unsafe {
        match CStr::from_ptr(name).to_str() {
            Ok(buffer_name) => {
                if let Some(buffer) = BRIDGE_STATE.shared_buffers.get(buffer_name) {
                    let copy_len = std::cmp::min(buffer.len, max_len);
                    ptr::copy_nonoverlapping(buffer.ptr, output, copy_len);
                    copy_len as isize
                } else {
                    -1 // Buffer not found
                }
            }
            Err(_) => -2, // Invalid name
        }
    }
}

/// Free a result returned by Rust
#[no_mangle]
pub extern "C" fn rust_bridge_free_result(result: FFIResult) {
    unsafe {
        if !result.data.is_null() {
            Vec::from_raw_parts(result.data, result.len, result.len);
        }
        if !result.error.is_null() {
            CString::from_raw(result.error);
        }
    }
}

/// Get bridge metrics
#[no_mangle]
pub extern "C" fn rust_bridge_get_metrics() -> FFIResult {
    let metrics = BRIDGE_STATE.metrics.read();
    let json = serde_json::json!({
        "calls_total": metrics.calls_total,
        "bytes_transferred": metrics.bytes_transferred,
        "errors_total": metrics.errors_total,
    });
    
    create_success_result(json.to_string().as_bytes())
}

// ============= High-Level Operations =============

/// Process ML inference request
#[no_mangle]
pub extern "C" fn rust_bridge_ml_inference(
    model_id: *const c_char,
    input_data: *const u8,
    input_len: usize,
    params: *const c_char,
) -> FFIResult {
    unsafe {
        let model = match CStr::from_ptr(model_id).to_str() {
            Ok(s) => s,
            Err(_) => return create_error_result("Invalid model ID"),
        };
        
        let params_str = match CStr::from_ptr(params).to_str() {
            Ok(s) => s,
            Err(_) => "{}",
        };
        
        let input = slice::from_raw_parts(input_data, input_len);
        
        // Simulate ML inference (would call actual ML service)
        let result = perform_ml_inference(model, input, params_str);
        
        match result {
            Ok(output) => create_success_result(&output),
            Err(e) => create_error_result(&e.to_string()),
        }
    }
}

/// Process vision task
#[no_mangle]
pub extern "C" fn rust_bridge_vision_process(
    task_type: *const c_char,
    image_data: *const u8,
    image_len: usize,
) -> FFIResult {
    unsafe {
        let task = match CStr::from_ptr(task_type).to_str() {
            Ok(s) => s,
            Err(_) => return create_error_result("Invalid task type"),
        };
        
        let image = slice::from_raw_parts(image_data, image_len);
        
        // Process vision task (would call actual vision service)
        let result = process_vision_task(task, image);
        
        match result {
            Ok(output) => create_success_result(&output),
            Err(e) => create_error_result(&e.to_string()),
        }
    }
}

// ============= Helper Functions =============

fn process_operation(operation: &str, data: &[u8]) -> FFIResult {
    match operation {
        "echo" => create_success_result(data),
        "transform" => {
            let transformed = data.iter().map(|b| b.wrapping_add(1)).collect::<Vec<_>>();
            create_success_result(&transformed)
        }
        "analyze" => {
            let analysis = format!("Data length: {}, checksum: {}", 
                data.len(), 
                data.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32))
            );
            create_success_result(analysis.as_bytes())
        }
        _ => {
            // Check if there's a registered callback
            if let Some(callback) = BRIDGE_STATE.callbacks.get(operation) {
                let result = callback(data);
                create_success_result(&result)
            } else {
                create_error_result(&format!("Unknown operation: {}", operation))
            }
        }
    }
}

fn perform_ml_inference(model: &str, input: &[u8], params: &str) -> Result<Vec<u8>, anyhow::Error> {
    // Placeholder for actual ML inference
    Ok(format!("ML inference result for model {} with {} bytes input and params: {}", 
        model, input.len(), params).into_bytes())
}

fn process_vision_task(task: &str, image: &[u8]) -> Result<Vec<u8>, anyhow::Error> {
    // Placeholder for actual vision processing
    Ok(format!("Vision task {} processed {} bytes", task, image.len()).into_bytes())
}

fn create_success_result(data: &[u8]) -> FFIResult {
    let mut result_data = data.to_vec();
    let len = result_data.len();
    let ptr = result_data.as_mut_ptr();
    std::mem::forget(result_data);
    
    FFIResult {
        success: 1,
        data: ptr,
        len,
        error: ptr::null_mut(),
    }
}

fn create_error_result(error: &str) -> FFIResult {
    let c_error = CString::new(error).unwrap_or_else(|_| CString::new("Unknown error").unwrap());
    
    BRIDGE_STATE.metrics.write().errors_total += 1;
    
    FFIResult {
        success: 0,
        data: ptr::null_mut(),
        len: 0,
        error: c_error.into_raw(),
    }
}

// ============= Async Bridge Functions =============

/// Async task handle for Go
#[repr(C)]
pub struct AsyncHandle {
    id: u64,
    ready: c_int,
}

static ASYNC_TASKS: Lazy<DashMap<u64, tokio::task::JoinHandle<Vec<u8>>>> = Lazy::new(DashMap::new);
static ASYNC_RESULTS: Lazy<DashMap<u64, Vec<u8>>> = Lazy::new(DashMap::new);

/// Start an async operation
#[no_mangle]
pub extern "C" fn rust_bridge_async_start(
    operation: *const c_char,
    data: *const u8,
    len: usize,
) -> AsyncHandle {
    static NEXT_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
    
    let id = NEXT_ID.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let op = unsafe { CStr::from_ptr(operation).to_str().unwrap_or("unknown") }.to_string();
    let input = unsafe { slice::from_raw_parts(data, len) }.to_vec();
    
    let handle = tokio::spawn(async move {
        // Simulate async work
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        format!("Async result for {} with {} bytes", op, input.len()).into_bytes()
    });
    
    ASYNC_TASKS.insert(id, handle);
    
    AsyncHandle { id, ready: 0 }
}

/// Check if async operation is complete
#[no_mangle]
pub extern "C" fn rust_bridge_async_check(handle: AsyncHandle) -> c_int {
    if ASYNC_RESULTS.contains_key(&handle.id) {
        return 1;
    }
    
    if let Some((_, task)) = ASYNC_TASKS.remove(&handle.id) {
        if task.is_finished() {
            if let Ok(result) = task.now_or_never().unwrap() {
                ASYNC_RESULTS.insert(handle.id, result);
                return 1;
            }
        } else {
            ASYNC_TASKS.insert(handle.id, task);
        }
    }
    
    0
}

/// Get async operation result
#[no_mangle]
pub extern "C" fn rust_bridge_async_get(handle: AsyncHandle) -> FFIResult {
    if let Some((_, result)) = ASYNC_RESULTS.remove(&handle.id) {
        create_success_result(&result)
    } else {
        create_error_result("Async operation not ready")
    }
}
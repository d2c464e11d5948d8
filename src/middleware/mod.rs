/*
 * Responsibility
 * - Router-level middleware (cross-cutting HTTP concerns)
 */
pub mod cors;
pub mod http;
